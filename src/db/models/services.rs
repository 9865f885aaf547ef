//! Database models for service jobs, including the status state machine.

use crate::types::{CarId, ServiceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lifecycle state of a service job.
///
/// The legal transitions are `Pending -> In Progress -> Completed`. `Cancelled`
/// can only be chosen at creation time; there is no cancel action afterwards.
/// The stored literal for the in-progress state carries a space, matching the
/// historical on-disk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum ServiceStatus {
    Pending,
    #[sqlx(rename = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl ServiceStatus {
    pub const ALL: [ServiceStatus; 4] = [
        ServiceStatus::Pending,
        ServiceStatus::InProgress,
        ServiceStatus::Completed,
        ServiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceStatus::Pending => "Pending",
            ServiceStatus::InProgress => "In Progress",
            ServiceStatus::Completed => "Completed",
            ServiceStatus::Cancelled => "Cancelled",
        }
    }

    /// Whether `start` may move this status to `InProgress`.
    pub fn can_start(&self) -> bool {
        matches!(self, ServiceStatus::Pending)
    }

    /// Whether `finish` may move this status to `Completed`.
    pub fn can_finish(&self) -> bool {
        matches!(self, ServiceStatus::Pending | ServiceStatus::InProgress)
    }
}

impl std::fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(ServiceStatus::Pending),
            "In Progress" => Ok(ServiceStatus::InProgress),
            "Completed" => Ok(ServiceStatus::Completed),
            "Cancelled" => Ok(ServiceStatus::Cancelled),
            other => Err(format!("unknown service status: {other}")),
        }
    }
}

/// Database request for creating a service job
#[derive(Debug, Clone)]
pub struct ServiceCreateDBRequest {
    pub service_type: String,
    pub cost: f64,
    pub status: ServiceStatus,
    pub car_id: CarId,
    pub description: Option<String>,
}

/// Database response for a service job
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceDBResponse {
    pub id: ServiceId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: String,
    pub cost: f64,
    pub status: ServiceStatus,
    pub car_id: CarId,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service joined with its car and the car's owner, as shown on the services page.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceListRow {
    pub id: ServiceId,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: String,
    pub cost: f64,
    pub status: ServiceStatus,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub car_name: String,
    pub car_model: String,
    pub customer_name: String,
    pub customer_phone: String,
}

/// One line of the admin report.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceReportRow {
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub service_type: String,
    pub cost: f64,
    pub status: ServiceStatus,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub car_name: String,
    pub car_model: String,
    pub car_year: i32,
    pub customer_name: String,
    pub customer_phone: String,
}

/// Aggregate counts and revenue figures for the admin report.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ServiceReportSummary {
    pub total_services: i64,
    pub pending_services: i64,
    pub in_progress_services: i64,
    pub completed_services: i64,
    pub cancelled_services: i64,
    pub total_revenue: f64,
    pub avg_service_cost: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ServiceStatus::ALL {
            let parsed: ServiceStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("InProgress".parse::<ServiceStatus>().is_err());
        assert!("pending".parse::<ServiceStatus>().is_err());
    }

    #[test]
    fn test_start_only_from_pending() {
        assert!(ServiceStatus::Pending.can_start());
        assert!(!ServiceStatus::InProgress.can_start());
        assert!(!ServiceStatus::Completed.can_start());
        assert!(!ServiceStatus::Cancelled.can_start());
    }

    #[test]
    fn test_finish_from_pending_or_in_progress() {
        assert!(ServiceStatus::Pending.can_finish());
        assert!(ServiceStatus::InProgress.can_finish());
        assert!(!ServiceStatus::Completed.can_finish());
        assert!(!ServiceStatus::Cancelled.can_finish());
    }
}
