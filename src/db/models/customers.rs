//! Database models for customers.

use crate::types::CustomerId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Database request for creating a customer
#[derive(Debug, Clone)]
pub struct CustomerCreateDBRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

/// Database response for a customer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerDBResponse {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Name and phone only, for the car form's owner dropdown.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerNameRow {
    pub id: CustomerId,
    pub name: String,
    pub phone: String,
}
