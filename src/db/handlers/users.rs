//! Database operations for user accounts.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};
use crate::types::UserId;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqliteConnection;

#[async_trait]
impl Repository for UserDBResponse {
    type CreateRequest = UserCreateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = ();

    async fn create(
        conn: &mut SqliteConnection,
        request: &Self::CreateRequest,
    ) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (username, password_hash, role, email, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, username, password_hash, role, email, created_at, last_login
            "#,
        )
        .bind(&request.username)
        .bind(&request.password_hash)
        .bind(request.role)
        .bind(&request.email)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;
        Ok(user)
    }

    async fn get_by_id(
        conn: &mut SqliteConnection,
        id: Self::Id,
    ) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            "SELECT id, username, password_hash, role, email, created_at, last_login
             FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    async fn list(
        conn: &mut SqliteConnection,
        _filter: &Self::Filter,
    ) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>(
            "SELECT id, username, password_hash, role, email, created_at, last_login
             FROM users ORDER BY username",
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(users)
    }

    async fn delete(conn: &mut SqliteConnection, id: Self::Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

impl UserDBResponse {
    pub async fn get_by_username(
        conn: &mut SqliteConnection,
        username: &str,
    ) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            "SELECT id, username, password_hash, role, email, created_at, last_login
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }

    /// Record a successful login.
    pub async fn touch_last_login(conn: &mut SqliteConnection, id: UserId) -> Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Replace the stored password hash, used by boot-time provisioning when
    /// a configured account already exists.
    pub async fn update_password(
        conn: &mut SqliteConnection,
        id: UserId,
        password_hash: &str,
    ) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::schema::migrate;
    use sqlx::SqlitePool;

    fn request(username: &str, role: Role) -> UserCreateDBRequest {
        UserCreateDBRequest {
            username: username.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role,
            email: None,
        }
    }

    #[sqlx::test]
    async fn test_create_and_lookup(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let created = UserDBResponse::create(&mut conn, &request("admin", Role::Admin))
            .await
            .unwrap();
        assert_eq!(created.username, "admin");
        assert_eq!(created.role, Role::Admin);
        assert!(created.last_login.is_none());

        let found = UserDBResponse::get_by_username(&mut conn, "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        assert!(UserDBResponse::get_by_username(&mut conn, "nobody")
            .await
            .unwrap()
            .is_none());
    }

    #[sqlx::test]
    async fn test_duplicate_username_rejected(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        UserDBResponse::create(&mut conn, &request("mechanic", Role::User))
            .await
            .unwrap();
        let err = UserDBResponse::create(&mut conn, &request("mechanic", Role::User))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[sqlx::test]
    async fn test_touch_last_login(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let user = UserDBResponse::create(&mut conn, &request("admin", Role::Admin))
            .await
            .unwrap();
        UserDBResponse::touch_last_login(&mut conn, user.id)
            .await
            .unwrap();
        let reloaded = UserDBResponse::get_by_id(&mut conn, user.id)
            .await
            .unwrap()
            .unwrap();
        assert!(reloaded.last_login.is_some());
    }

    #[sqlx::test]
    async fn test_update_password(pool: SqlitePool) {
        migrate(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        let user = UserDBResponse::create(&mut conn, &request("admin", Role::Admin))
            .await
            .unwrap();
        UserDBResponse::update_password(&mut conn, user.id, "$argon2id$new")
            .await
            .unwrap();
        let reloaded = UserDBResponse::get_by_id(&mut conn, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.password_hash, "$argon2id$new");

        let err = UserDBResponse::update_password(&mut conn, 9999, "$x")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }
}
