//! Request/response types for login and the dashboard.

use serde::{Deserialize, Serialize};

/// Login form submission.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Dashboard page payload: headline counts for the landing page.
#[derive(Debug, Serialize)]
pub struct DashboardPage {
    pub username: String,
    pub role: String,
    pub total_customers: i64,
    pub total_cars: i64,
    pub total_services: i64,
    pub pending_services: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}
