//! HTTP request handlers.

pub mod auth;
pub mod cars;
pub mod customers;
pub mod reports;
pub mod services;
