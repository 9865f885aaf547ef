//! Request/response types for the customers page.

use crate::db::models::customers::CustomerDBResponse;
use serde::{Deserialize, Serialize};

/// Customer form submission. Optional fields arrive as empty strings from
/// blank inputs and are normalized in the handler.
#[derive(Debug, Deserialize)]
pub struct CustomerForm {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
}

/// Customers page payload.
#[derive(Debug, Serialize)]
pub struct CustomersPage {
    pub customers: Vec<CustomerDBResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}
