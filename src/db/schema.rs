//! Boot-time schema migration.
//!
//! Each table is inspected via `PRAGMA table_info`: missing tables are created
//! with the full target schema, existing tables gain any missing columns
//! through additive `ALTER TABLE` statements with a backfill where the column
//! has a sensible historical value. The whole migration runs inside a single
//! transaction - on any failure nothing is committed and startup must halt.
//!
//! Running this any number of times against any historical schema version
//! converges to the same final schema without data loss.

use crate::db::errors::Result;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::{info, instrument};

const CREATE_USERS: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT UNIQUE NOT NULL,
    password_hash TEXT NOT NULL,
    role TEXT NOT NULL CHECK (role IN ('admin', 'user')),
    email TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    last_login TEXT
)
"#;

const CREATE_CUSTOMERS: &str = r#"
CREATE TABLE customers (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT UNIQUE NOT NULL,
    email TEXT,
    address TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

const CREATE_CARS: &str = r#"
CREATE TABLE cars (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    model TEXT NOT NULL,
    year INTEGER NOT NULL CHECK (year >= 1900),
    engine_type TEXT NOT NULL,
    customer_id INTEGER NOT NULL,
    license_plate TEXT,
    vin TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (customer_id) REFERENCES customers (id) ON DELETE CASCADE
)
"#;

const CREATE_SERVICES: &str = r#"
CREATE TABLE services (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    cost REAL NOT NULL CHECK (cost > 0),
    status TEXT NOT NULL CHECK (status IN ('Pending', 'In Progress', 'Completed', 'Cancelled')),
    car_id INTEGER NOT NULL,
    description TEXT,
    start_date TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    end_date TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    FOREIGN KEY (car_id) REFERENCES cars (id) ON DELETE CASCADE
)
"#;

/// Run the full schema migration. Fails atomically: the caller must treat any
/// error as fatal to startup.
#[instrument(skip_all, err)]
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    migrate_users(&mut tx).await?;
    migrate_customers(&mut tx).await?;
    migrate_cars(&mut tx).await?;
    migrate_services(&mut tx).await?;
    create_indexes(&mut tx).await?;

    tx.commit().await?;
    info!("Schema migrated");
    Ok(())
}

/// Column names of `table`, empty when the table does not exist.
/// Table names are compile-time constants here; PRAGMA cannot take binds.
pub(crate) async fn table_columns(conn: &mut SqliteConnection, table: &str) -> Result<Vec<String>> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.iter().map(|row| row.get::<String, _>("name")).collect())
}

async fn migrate_users(conn: &mut SqliteConnection) -> Result<()> {
    let columns = table_columns(conn, "users").await?;

    if columns.is_empty() {
        sqlx::query(CREATE_USERS).execute(&mut *conn).await?;
        info!("Created users table");
        return Ok(());
    }

    if !columns.iter().any(|c| c == "email") {
        sqlx::query("ALTER TABLE users ADD COLUMN email TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "created_at") {
        sqlx::query("ALTER TABLE users ADD COLUMN created_at TEXT")
            .execute(&mut *conn)
            .await?;
        // Legacy rows predate the column; stamp them with "now"
        sqlx::query("UPDATE users SET created_at = datetime('now') WHERE created_at IS NULL")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "last_login") {
        sqlx::query("ALTER TABLE users ADD COLUMN last_login TEXT")
            .execute(&mut *conn)
            .await?;
    }
    info!("Migrated existing users table");
    Ok(())
}

async fn migrate_customers(conn: &mut SqliteConnection) -> Result<()> {
    let columns = table_columns(conn, "customers").await?;

    if columns.is_empty() {
        sqlx::query(CREATE_CUSTOMERS).execute(&mut *conn).await?;
        info!("Created customers table");
        return Ok(());
    }

    if !columns.iter().any(|c| c == "email") {
        sqlx::query("ALTER TABLE customers ADD COLUMN email TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "address") {
        sqlx::query("ALTER TABLE customers ADD COLUMN address TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "updated_at") {
        sqlx::query("ALTER TABLE customers ADD COLUMN updated_at TEXT")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE customers SET updated_at = created_at WHERE updated_at IS NULL")
            .execute(&mut *conn)
            .await?;
    }
    info!("Migrated existing customers table");
    Ok(())
}

async fn migrate_cars(conn: &mut SqliteConnection) -> Result<()> {
    let columns = table_columns(conn, "cars").await?;

    if columns.is_empty() {
        sqlx::query(CREATE_CARS).execute(&mut *conn).await?;
        info!("Created cars table");
        return Ok(());
    }

    if !columns.iter().any(|c| c == "license_plate") {
        sqlx::query("ALTER TABLE cars ADD COLUMN license_plate TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "vin") {
        sqlx::query("ALTER TABLE cars ADD COLUMN vin TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "updated_at") {
        sqlx::query("ALTER TABLE cars ADD COLUMN updated_at TEXT")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE cars SET updated_at = created_at WHERE updated_at IS NULL")
            .execute(&mut *conn)
            .await?;
    }
    info!("Migrated existing cars table");
    Ok(())
}

async fn migrate_services(conn: &mut SqliteConnection) -> Result<()> {
    let columns = table_columns(conn, "services").await?;

    if columns.is_empty() {
        sqlx::query(CREATE_SERVICES).execute(&mut *conn).await?;
        info!("Created services table");
        return Ok(());
    }

    if !columns.iter().any(|c| c == "description") {
        sqlx::query("ALTER TABLE services ADD COLUMN description TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "start_date") {
        sqlx::query("ALTER TABLE services ADD COLUMN start_date TEXT")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE services SET start_date = created_at WHERE start_date IS NULL")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "end_date") {
        sqlx::query("ALTER TABLE services ADD COLUMN end_date TEXT")
            .execute(&mut *conn)
            .await?;
    }
    if !columns.iter().any(|c| c == "updated_at") {
        sqlx::query("ALTER TABLE services ADD COLUMN updated_at TEXT")
            .execute(&mut *conn)
            .await?;
        sqlx::query("UPDATE services SET updated_at = created_at WHERE updated_at IS NULL")
            .execute(&mut *conn)
            .await?;
    }
    info!("Migrated existing services table");
    Ok(())
}

async fn create_indexes(conn: &mut SqliteConnection) -> Result<()> {
    for stmt in [
        "CREATE INDEX IF NOT EXISTS idx_cars_customer_id ON cars(customer_id)",
        "CREATE INDEX IF NOT EXISTS idx_services_car_id ON services(car_id)",
        "CREATE INDEX IF NOT EXISTS idx_services_status ON services(status)",
    ] {
        sqlx::query(stmt).execute(&mut *conn).await?;
    }
    Ok(())
}
