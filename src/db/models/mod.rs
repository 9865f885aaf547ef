//! Database-layer request and response models.

pub mod cars;
pub mod customers;
pub mod services;
pub mod users;
