//! Request/response types for the services page.

use crate::db::models::cars::CarPickerRow;
use crate::db::models::services::{ServiceListRow, ServiceStatus};
use serde::{Deserialize, Serialize};

/// Service form submission. `cost` and `car_id` arrive as raw strings and are
/// validated in the handler; `status` defaults to pending when absent.
#[derive(Debug, Deserialize)]
pub struct ServiceForm {
    #[serde(rename = "type")]
    pub service_type: String,
    pub cost: String,
    #[serde(default)]
    pub status: String,
    pub car_id: String,
    #[serde(default)]
    pub description: String,
}

/// Query-string filters accepted by the services listing. Empty strings are
/// treated as absent, matching how browser filter forms submit.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceListQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status_filter: Option<String>,
    #[serde(default)]
    pub customer_filter: Option<String>,
}

/// Services page payload: the filtered listing, the car dropdown source, the
/// selectable statuses, and an echo of the active filters.
#[derive(Debug, Serialize)]
pub struct ServicesPage {
    pub services: Vec<ServiceListRow>,
    pub cars: Vec<CarPickerRow>,
    pub statuses: Vec<&'static str>,
    pub search: String,
    pub status_filter: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

impl ServicesPage {
    pub fn status_options() -> Vec<&'static str> {
        ServiceStatus::ALL.iter().map(|s| s.as_str()).collect()
    }
}
