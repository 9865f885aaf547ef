//! Database operations for customers.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::customers::{
    CustomerCreateDBRequest, CustomerDBResponse, CustomerNameRow,
};
use crate::types::{CustomerId, Operation};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;

#[async_trait]
impl Repository for CustomerDBResponse {
    type CreateRequest = CustomerCreateDBRequest;
    type Response = CustomerDBResponse;
    type Id = CustomerId;
    type Filter = ();

    async fn create(
        conn: &mut SqliteConnection,
        request: &Self::CreateRequest,
    ) -> Result<Self::Response> {
        let now = Utc::now();
        let customer = sqlx::query_as::<_, CustomerDBResponse>(
            r#"
            INSERT INTO customers (name, phone, email, address, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, name, phone, email, address, created_at, updated_at
            "#,
        )
        .bind(&request.name)
        .bind(&request.phone)
        .bind(&request.email)
        .bind(&request.address)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        Ok(customer)
    }

    async fn get_by_id(
        conn: &mut SqliteConnection,
        id: Self::Id,
    ) -> Result<Option<Self::Response>> {
        let customer = sqlx::query_as::<_, CustomerDBResponse>(
            "SELECT id, name, phone, email, address, created_at, updated_at
             FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(customer)
    }

    async fn list(
        conn: &mut SqliteConnection,
        _filter: &Self::Filter,
    ) -> Result<Vec<Self::Response>> {
        let customers = sqlx::query_as::<_, CustomerDBResponse>(
            "SELECT id, name, phone, email, address, created_at, updated_at
             FROM customers ORDER BY created_at DESC",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(customers)
    }

    /// Refuses to delete a customer who still has cars registered. The
    /// storage-level cascade would silently take the cars (and their service
    /// history) with it, so the caller must remove those first.
    async fn delete(conn: &mut SqliteConnection, id: Self::Id) -> Result<()> {
        let car_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cars WHERE customer_id = ?")
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;
        if car_count > 0 {
            return Err(DbError::ProtectedEntity {
                operation: Operation::Delete,
                entity_type: "customer",
                entity_id: Some(id.to_string()),
                reason: format!("they have {car_count} car(s) registered"),
            });
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

impl CustomerDBResponse {
    /// Compact listing for the car form's owner dropdown.
    pub async fn list_names(conn: &mut SqliteConnection) -> Result<Vec<CustomerNameRow>> {
        let rows = sqlx::query_as::<_, CustomerNameRow>(
            "SELECT id, name, phone FROM customers ORDER BY name",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::migrate;
    use sqlx::SqlitePool;

    fn jane() -> CustomerCreateDBRequest {
        CustomerCreateDBRequest {
            name: "Jane Doe".to_string(),
            phone: "+1 555 010 1234".to_string(),
            email: Some("jane@example.com".to_string()),
            address: None,
        }
    }

    #[sqlx::test]
    async fn test_create_and_list(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let created = CustomerDBResponse::create(&mut conn, &jane()).await.unwrap();
        assert_eq!(created.name, "Jane Doe");
        assert_eq!(created.created_at, created.updated_at);

        let listed = CustomerDBResponse::list(&mut conn, &()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);
    }

    #[sqlx::test]
    async fn test_duplicate_phone_rejected(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        CustomerDBResponse::create(&mut conn, &jane()).await.unwrap();
        let mut second = jane();
        second.name = "Different Name".to_string();
        let err = CustomerDBResponse::create(&mut conn, &second).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_delete_guarded_by_cars(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let customer = CustomerDBResponse::create(&mut conn, &jane()).await.unwrap();
        sqlx::query(
            "INSERT INTO cars (name, model, year, engine_type, customer_id)
             VALUES ('Volvo', 'V60', 2020, 'Diesel', ?)",
        )
        .bind(customer.id)
        .execute(&mut *conn)
        .await
        .unwrap();

        let err = CustomerDBResponse::delete(&mut conn, customer.id).await.unwrap_err();
        match err {
            DbError::ProtectedEntity { reason, .. } => {
                assert_eq!(reason, "they have 1 car(s) registered");
            }
            other => panic!("expected ProtectedEntity, got {other:?}"),
        }

        // Still there
        assert!(CustomerDBResponse::get_by_id(&mut conn, customer.id)
            .await
            .unwrap()
            .is_some());
    }

    #[sqlx::test]
    async fn test_delete_without_cars(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let customer = CustomerDBResponse::create(&mut conn, &jane()).await.unwrap();
        CustomerDBResponse::delete(&mut conn, customer.id).await.unwrap();
        assert!(CustomerDBResponse::get_by_id(&mut conn, customer.id)
            .await
            .unwrap()
            .is_none());

        let err = CustomerDBResponse::delete(&mut conn, customer.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    async fn test_list_names_sorted(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        for (name, phone) in [("Zed", "555-000-0001"), ("Amy", "555-000-0002")] {
            CustomerDBResponse::create(
                &mut conn,
                &CustomerCreateDBRequest {
                    name: name.to_string(),
                    phone: phone.to_string(),
                    email: None,
                    address: None,
                },
            )
            .await
            .unwrap();
        }

        let names = CustomerDBResponse::list_names(&mut conn).await.unwrap();
        assert_eq!(
            names.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
            vec!["Amy", "Zed"]
        );
    }
}
