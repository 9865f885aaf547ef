//! Database models for cars.

use crate::types::{CarId, CustomerId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a car
#[derive(Debug, Clone)]
pub struct CarCreateDBRequest {
    pub name: String,
    pub model: String,
    pub year: i32,
    pub engine_type: String,
    pub customer_id: CustomerId,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
}

/// Database response for a car
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarDBResponse {
    pub id: CarId,
    pub name: String,
    pub model: String,
    pub year: i32,
    pub engine_type: String,
    pub customer_id: CustomerId,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Car joined with its owner, as shown on the cars page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarListRow {
    pub id: CarId,
    pub name: String,
    pub model: String,
    pub year: i32,
    pub engine_type: String,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
}

/// Compact joined summary for the service form's car dropdown.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CarPickerRow {
    pub id: CarId,
    pub name: String,
    pub model: String,
    pub year: i32,
    pub customer_name: String,
}
