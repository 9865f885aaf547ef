//! garagectl - a vehicle workshop record keeper.
//!
//! Tracks customers, their cars, and the service jobs performed on those
//! cars, behind a two-role login (admin, user). Storage is a single SQLite
//! file whose schema is migrated idempotently at boot; the HTTP surface is a
//! small set of browser-form routes with redirect-and-flash semantics.

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::{pool::PoolConnection, Sqlite, SqlitePool};
use std::future::Future;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
pub mod types;
pub mod validation;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use errors::{Error, Result};

use crate::api::handlers::{auth as auth_handlers, cars, customers, reports, services};
use crate::auth::middleware::{require_admin, require_login};
use crate::auth::password;
use crate::db::handlers::repository::Repository;
use crate::db::models::users::{UserCreateDBRequest, UserDBResponse};

/// Shared state available to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Short-lived connection for a single request.
    pub(crate) async fn conn(&self) -> db::errors::Result<PoolConnection<Sqlite>> {
        Ok(self.db.acquire().await?)
    }
}

/// Assemble the full route tree.
///
/// Three rings: public (login), login-required, and admin-only. The admin
/// guard layers inside the login guard so the identity is attached first.
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/delete_customer/{id}", post(customers::delete_customer))
        .route("/delete_car/{id}", post(cars::delete_car))
        .route("/delete_service/{id}", post(services::delete_service))
        .route("/report", get(reports::report))
        .layer(middleware::from_fn(require_admin));

    let protected_routes = Router::new()
        .route("/dashboard", get(auth_handlers::dashboard))
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route("/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/services",
            get(services::list_services).post(services::create_service),
        )
        .route("/start_service/{id}", post(services::start_service))
        .route("/end_service/{id}", post(services::end_service))
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), require_login));

    Router::new()
        .route("/", get(auth_handlers::home))
        .route(
            "/login",
            get(auth_handlers::login_page).post(auth_handlers::login),
        )
        // Logout stays public so a stale or missing session can still be
        // cleared cleanly
        .route("/logout", get(auth_handlers::logout))
        .route("/healthz", get(|| async { "OK" }))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ensure every configured account exists with the configured password.
///
/// Idempotent: existing accounts get their password refreshed, missing ones
/// are created. Roles are immutable after creation; a config/database
/// mismatch is logged but never applied.
pub async fn provision_bootstrap_users(
    pool: &SqlitePool,
    users: &[config::BootstrapUser],
) -> anyhow::Result<()> {
    let mut conn = pool.acquire().await?;
    for entry in users {
        let password = entry.password.clone();
        let hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
            .await
            .context("password hashing task panicked")??;

        match UserDBResponse::get_by_username(&mut conn, &entry.username).await? {
            Some(existing) => {
                UserDBResponse::update_password(&mut conn, existing.id, &hash).await?;
                if existing.role != entry.role {
                    warn!(
                        username = %entry.username,
                        stored = %existing.role,
                        configured = %entry.role,
                        "Configured role differs from stored role; roles are immutable after creation"
                    );
                }
                info!(username = %entry.username, "Refreshed bootstrap user password");
            }
            None => {
                UserDBResponse::create(
                    &mut conn,
                    &UserCreateDBRequest {
                        username: entry.username.clone(),
                        password_hash: hash,
                        role: entry.role,
                        email: entry.email.clone(),
                    },
                )
                .await?;
                info!(username = %entry.username, role = %entry.role, "Provisioned bootstrap user");
            }
        }
    }
    Ok(())
}

/// The running service: database pool plus router, ready to serve.
pub struct Application {
    state: AppState,
    router: Router,
}

impl Application {
    /// Open the database, migrate the schema, provision configured accounts,
    /// and build the router. Any failure here must abort startup.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database.path).await?;
        db::schema::migrate(&pool)
            .await
            .context("schema migration failed; refusing to start")?;
        provision_bootstrap_users(&pool, &config.bootstrap_users).await?;

        let state = AppState {
            db: pool,
            config: Arc::new(config),
        };
        let router = build_router(state.clone());
        Ok(Self { state, router })
    }

    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let addr = self.state.config.bind_address();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Listening on {addr}");
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}
