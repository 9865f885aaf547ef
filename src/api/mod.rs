//! The HTTP surface: handlers, request/response models, cookies and flash
//! messages.

pub mod cookies;
pub mod flash;
pub mod handlers;
pub mod models;
