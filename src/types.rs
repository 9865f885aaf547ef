//! Shared identifier and operation types.

/// Row id of a user account.
pub type UserId = i64;
/// Row id of a customer.
pub type CustomerId = i64;
/// Row id of a car.
pub type CarId = i64;
/// Row id of a service job.
pub type ServiceId = i64;

/// The operation being attempted, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        write!(f, "{s}")
    }
}
