//! Database operations for cars.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::cars::{CarCreateDBRequest, CarDBResponse, CarListRow, CarPickerRow};
use crate::types::{CarId, Operation};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;

#[async_trait]
impl Repository for CarDBResponse {
    type CreateRequest = CarCreateDBRequest;
    type Response = CarDBResponse;
    type Id = CarId;
    type Filter = ();

    async fn create(
        conn: &mut SqliteConnection,
        request: &Self::CreateRequest,
    ) -> Result<Self::Response> {
        let now = Utc::now();
        let car = sqlx::query_as::<_, CarDBResponse>(
            r#"
            INSERT INTO cars (name, model, year, engine_type, customer_id, license_plate, vin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, model, year, engine_type, customer_id, license_plate, vin, created_at, updated_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.model)
        .bind(request.year)
        .bind(&request.engine_type)
        .bind(request.customer_id)
        .bind(&request.license_plate)
        .bind(&request.vin)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        Ok(car)
    }

    async fn get_by_id(
        conn: &mut SqliteConnection,
        id: Self::Id,
    ) -> Result<Option<Self::Response>> {
        let car = sqlx::query_as::<_, CarDBResponse>(
            "SELECT id, name, model, year, engine_type, customer_id, license_plate, vin, created_at, updated_at
             FROM cars WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(car)
    }

    async fn list(
        conn: &mut SqliteConnection,
        _filter: &Self::Filter,
    ) -> Result<Vec<Self::Response>> {
        let cars = sqlx::query_as::<_, CarDBResponse>(
            "SELECT id, name, model, year, engine_type, customer_id, license_plate, vin, created_at, updated_at
             FROM cars ORDER BY created_at DESC",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(cars)
    }

    /// Refuses to delete a car that still has service records.
    async fn delete(conn: &mut SqliteConnection, id: Self::Id) -> Result<()> {
        let service_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE car_id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
        if service_count > 0 {
            return Err(DbError::ProtectedEntity {
                operation: Operation::Delete,
                entity_type: "car",
                entity_id: Some(id.to_string()),
                reason: format!("it has {service_count} service(s) registered"),
            });
        }

        let result = sqlx::query("DELETE FROM cars WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

impl CarDBResponse {
    /// Cars joined with their owner, newest first, for the cars page.
    pub async fn list_with_owners(conn: &mut SqliteConnection) -> Result<Vec<CarListRow>> {
        let rows = sqlx::query_as::<_, CarListRow>(
            r#"
            SELECT c.id, c.name, c.model, c.year, c.engine_type, c.license_plate, c.vin,
                   c.created_at, c.updated_at,
                   cu.name AS customer_name, cu.phone AS customer_phone
            FROM cars c
            JOIN customers cu ON c.customer_id = cu.id
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Compact listing for the service form's car dropdown, grouped by owner.
    pub async fn list_for_picker(conn: &mut SqliteConnection) -> Result<Vec<CarPickerRow>> {
        let rows = sqlx::query_as::<_, CarPickerRow>(
            r#"
            SELECT c.id, c.name, c.model, c.year, cu.name AS customer_name
            FROM cars c
            JOIN customers cu ON c.customer_id = cu.id
            ORDER BY cu.name, c.name
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}
