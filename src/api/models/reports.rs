//! Response types for the admin report.

use crate::db::models::services::{ServiceReportRow, ServiceReportSummary};
use serde::Serialize;

/// Report page payload: aggregates plus the per-service lines.
#[derive(Debug, Serialize)]
pub struct ReportPage {
    #[serde(flatten)]
    pub summary: ServiceReportSummary,
    pub services: Vec<ServiceReportRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}
