//! Request and response types for the HTTP surface.

pub mod auth;
pub mod cars;
pub mod customers;
pub mod reports;
pub mod services;
pub mod users;
