//! Authentication: password hashing, JWT session cookies, and route guards.

pub mod middleware;
pub mod password;
pub mod session;
