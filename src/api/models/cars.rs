//! Request/response types for the cars page.

use crate::db::models::cars::CarListRow;
use crate::db::models::customers::CustomerNameRow;
use serde::{Deserialize, Serialize};

/// Car form submission. `year` and `customer_id` arrive as raw strings and
/// are validated in the handler.
#[derive(Debug, Deserialize)]
pub struct CarForm {
    pub name: String,
    pub model: String,
    pub year: String,
    pub engine_type: String,
    pub customer_id: String,
    #[serde(default)]
    pub license_plate: String,
    #[serde(default)]
    pub vin: String,
}

/// Cars page payload: the joined listing plus the owner dropdown source.
#[derive(Debug, Serialize)]
pub struct CarsPage {
    pub cars: Vec<CarListRow>,
    pub customers: Vec<CustomerNameRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}
