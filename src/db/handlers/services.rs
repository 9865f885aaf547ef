//! Database operations for service jobs, including the status state machine
//! and the admin report aggregates.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::services::{
    ServiceCreateDBRequest, ServiceDBResponse, ServiceListRow, ServiceReportRow,
    ServiceReportSummary, ServiceStatus,
};
use crate::types::{Operation, ServiceId};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const SELECT_COLUMNS: &str = "id, type, cost, status, car_id, description, start_date, end_date, created_at, updated_at";

/// Optional narrowing of the services listing. All criteria combine with AND.
#[derive(Debug, Default, Clone)]
pub struct ServiceFilter {
    /// Substring match against service type, description, car name, or
    /// customer name.
    pub search: Option<String>,
    pub status: Option<ServiceStatus>,
    /// Exact customer name match.
    pub customer_name: Option<String>,
    /// Hide cancelled services entirely. Set for non-admin sessions.
    pub exclude_cancelled: bool,
}

#[async_trait]
impl Repository for ServiceDBResponse {
    type CreateRequest = ServiceCreateDBRequest;
    type Response = ServiceDBResponse;
    type Id = ServiceId;
    type Filter = ();

    async fn create(
        conn: &mut SqliteConnection,
        request: &Self::CreateRequest,
    ) -> Result<Self::Response> {
        let now = Utc::now();
        let service = sqlx::query_as::<_, ServiceDBResponse>(&format!(
            r#"
            INSERT INTO services (type, cost, status, car_id, description, start_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING {SELECT_COLUMNS}
            "#,
        ))
        .bind(&request.service_type)
        .bind(request.cost)
        .bind(request.status)
        .bind(request.car_id)
        .bind(&request.description)
        .bind(now)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        Ok(service)
    }

    async fn get_by_id(
        conn: &mut SqliteConnection,
        id: Self::Id,
    ) -> Result<Option<Self::Response>> {
        let service = sqlx::query_as::<_, ServiceDBResponse>(&format!(
            "SELECT {SELECT_COLUMNS} FROM services WHERE id = ?",
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(service)
    }

    async fn list(
        conn: &mut SqliteConnection,
        _filter: &Self::Filter,
    ) -> Result<Vec<Self::Response>> {
        let services = sqlx::query_as::<_, ServiceDBResponse>(&format!(
            "SELECT {SELECT_COLUMNS} FROM services ORDER BY created_at DESC",
        ))
        .fetch_all(&mut *conn)
        .await?;
        Ok(services)
    }

    /// Unconditional delete; any status may be removed. Role restrictions are
    /// enforced at the routing layer.
    async fn delete(conn: &mut SqliteConnection, id: Self::Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

impl ServiceDBResponse {
    /// Services joined with car and owner, newest first, optionally filtered.
    pub async fn list_filtered(
        conn: &mut SqliteConnection,
        filter: &ServiceFilter,
    ) -> Result<Vec<ServiceListRow>> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT s.id, s.type, s.cost, s.status, s.description,
                   s.start_date, s.end_date, s.created_at, s.updated_at,
                   c.name AS car_name, c.model AS car_model,
                   cu.name AS customer_name, cu.phone AS customer_phone
            FROM services s
            JOIN cars c ON s.car_id = c.id
            JOIN customers cu ON c.customer_id = cu.id
            WHERE 1 = 1
            "#,
        );

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            query.push(" AND (s.type LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR s.description LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR c.name LIKE ");
            query.push_bind(pattern.clone());
            query.push(" OR cu.name LIKE ");
            query.push_bind(pattern);
            query.push(")");
        }
        if let Some(status) = filter.status {
            query.push(" AND s.status = ");
            query.push_bind(status);
        }
        if let Some(customer_name) = filter.customer_name.as_deref().filter(|s| !s.is_empty()) {
            query.push(" AND cu.name = ");
            query.push_bind(customer_name.to_string());
        }
        if filter.exclude_cancelled {
            query.push(" AND s.status != ");
            query.push_bind(ServiceStatus::Cancelled);
        }
        query.push(" ORDER BY s.created_at DESC");

        let rows = query
            .build_query_as::<ServiceListRow>()
            .fetch_all(&mut *conn)
            .await?;
        Ok(rows)
    }

    /// Move a pending service to `In Progress`.
    pub async fn start(conn: &mut SqliteConnection, id: ServiceId) -> Result<ServiceDBResponse> {
        let service = Self::get_by_id(&mut *conn, id).await?.ok_or(DbError::NotFound)?;
        if !service.status.can_start() {
            return Err(DbError::ProtectedEntity {
                operation: Operation::Update,
                entity_type: "service",
                entity_id: Some(id.to_string()),
                reason: format!(
                    "Service is already {}.",
                    service.status.as_str().to_lowercase()
                ),
            });
        }
        Self::set_status(conn, id, ServiceStatus::InProgress, false).await
    }

    /// Move a pending or in-progress service to `Completed`, stamping the end
    /// date.
    pub async fn finish(conn: &mut SqliteConnection, id: ServiceId) -> Result<ServiceDBResponse> {
        let service = Self::get_by_id(&mut *conn, id).await?.ok_or(DbError::NotFound)?;
        if !service.status.can_finish() {
            let reason = match service.status {
                ServiceStatus::Cancelled => "Cannot complete a cancelled service.".to_string(),
                status => format!("Service is already {}.", status.as_str().to_lowercase()),
            };
            return Err(DbError::ProtectedEntity {
                operation: Operation::Update,
                entity_type: "service",
                entity_id: Some(id.to_string()),
                reason,
            });
        }
        Self::set_status(conn, id, ServiceStatus::Completed, true).await
    }

    async fn set_status(
        conn: &mut SqliteConnection,
        id: ServiceId,
        status: ServiceStatus,
        stamp_end_date: bool,
    ) -> Result<ServiceDBResponse> {
        let now = Utc::now();
        let sql = if stamp_end_date {
            format!(
                "UPDATE services SET status = ?, updated_at = ?, end_date = ? WHERE id = ? RETURNING {SELECT_COLUMNS}"
            )
        } else {
            format!(
                "UPDATE services SET status = ?, updated_at = ? WHERE id = ? RETURNING {SELECT_COLUMNS}"
            )
        };
        let mut query = sqlx::query_as::<_, ServiceDBResponse>(&sql)
            .bind(status)
            .bind(now);
        if stamp_end_date {
            query = query.bind(now);
        }
        let service = query.bind(id).fetch_one(&mut *conn).await?;
        Ok(service)
    }

    /// Aggregate figures for the admin report. Revenue and average are over
    /// all services regardless of status.
    pub async fn report_summary(conn: &mut SqliteConnection) -> Result<ServiceReportSummary> {
        let summary = sqlx::query_as::<_, ServiceReportSummary>(
            r#"
            SELECT
                COUNT(*) AS total_services,
                COALESCE(SUM(status = 'Pending'), 0) AS pending_services,
                COALESCE(SUM(status = 'In Progress'), 0) AS in_progress_services,
                COALESCE(SUM(status = 'Completed'), 0) AS completed_services,
                COALESCE(SUM(status = 'Cancelled'), 0) AS cancelled_services,
                COALESCE(SUM(cost), 0.0) AS total_revenue,
                COALESCE(AVG(cost), 0.0) AS avg_service_cost
            FROM services
            "#,
        )
        .fetch_one(&mut *conn)
        .await?;
        Ok(summary)
    }

    /// Per-service report lines, newest first.
    pub async fn report_rows(conn: &mut SqliteConnection) -> Result<Vec<ServiceReportRow>> {
        let rows = sqlx::query_as::<_, ServiceReportRow>(
            r#"
            SELECT s.type, s.cost, s.status, s.start_date, s.end_date, s.created_at,
                   c.name AS car_name, c.model AS car_model, c.year AS car_year,
                   cu.name AS customer_name, cu.phone AS customer_phone
            FROM services s
            JOIN cars c ON s.car_id = c.id
            JOIN customers cu ON c.customer_id = cu.id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
