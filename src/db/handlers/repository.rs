//! Common CRUD surface shared by every entity handler.

use crate::db::errors::Result;
use async_trait::async_trait;
use sqlx::SqliteConnection;

/// Uniform create/read/list/delete operations over a database connection.
///
/// Entity-specific operations (joined listings, status transitions, lookup by
/// natural key) live as inherent methods next to each implementation.
#[async_trait]
pub trait Repository: Sized {
    type CreateRequest: Send + Sync;
    type Response: Send;
    type Id: Send;
    type Filter: Send + Sync;

    async fn create(
        conn: &mut SqliteConnection,
        request: &Self::CreateRequest,
    ) -> Result<Self::Response>;

    async fn get_by_id(conn: &mut SqliteConnection, id: Self::Id)
        -> Result<Option<Self::Response>>;

    async fn list(conn: &mut SqliteConnection, filter: &Self::Filter)
        -> Result<Vec<Self::Response>>;

    /// Remove the entity. Implementations may refuse with
    /// [`DbError::ProtectedEntity`](crate::db::errors::DbError::ProtectedEntity)
    /// when dependent records exist.
    async fn delete(conn: &mut SqliteConnection, id: Self::Id) -> Result<()>;
}
