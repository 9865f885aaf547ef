//! Entity handlers implementing the [`Repository`](repository::Repository)
//! surface plus entity-specific queries.

pub mod cars;
pub mod customers;
pub mod repository;
pub mod services;
pub mod users;
