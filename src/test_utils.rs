//! Shared helpers for route-level tests.
//!
//! Tests drive the real router through `axum_test::TestServer` with cookie
//! persistence switched on, so login sessions and flash messages behave as
//! they do in a browser.

use crate::api::flash::FLASH_COOKIE;
use crate::api::models::users::Role;
use crate::auth::password::{hash_string_with_params, Argon2Params};
use crate::config::Config;
use crate::db::schema::migrate;
use crate::{build_router, AppState};
use axum::http::{header::SET_COOKIE, StatusCode};
use axum_test::{TestResponse, TestServer, TestServerConfig};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use sqlx::SqlitePool;
use std::sync::Arc;

pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.auth.secret_key = "test-secret".to_string();
    config
}

/// Migrate the schema and wrap the full router in a cookie-persisting test
/// server.
pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    migrate(&pool).await.expect("schema migration failed");
    let state = AppState {
        db: pool,
        config: Arc::new(create_test_config()),
    };
    let config = TestServerConfig {
        save_cookies: true,
        ..Default::default()
    };
    TestServer::new_with_config(build_router(state), config).expect("failed to build test server")
}

/// Insert (or refresh) an account directly, with deliberately weak hashing
/// parameters so suites that log in a lot stay fast.
pub async fn provision_user(pool: &SqlitePool, username: &str, password: &str, role: Role) {
    migrate(pool).await.expect("schema migration failed");
    let hash = hash_string_with_params(password, Argon2Params::insecure_for_tests())
        .expect("failed to hash test password");
    sqlx::query(
        "INSERT INTO users (username, password_hash, role) VALUES (?, ?, ?)
         ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash",
    )
    .bind(username)
    .bind(hash)
    .bind(role)
    .execute(pool)
    .await
    .expect("failed to provision test user");
}

/// Log in through the real login route; the session cookie sticks to the
/// server's cookie jar.
pub async fn login_as(server: &TestServer, username: &str, password: &str) {
    let response = server
        .post("/login")
        .form(&[("username", username), ("password", password)])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/dashboard", "login failed");
}

/// Test server with a freshly provisioned, logged-in admin.
pub async fn seed_admin_session(pool: &SqlitePool) -> TestServer {
    let server = create_test_app(pool.clone()).await;
    provision_user(pool, "admin", "admin-pass", Role::Admin).await;
    login_as(&server, "admin", "admin-pass").await;
    server
}

/// The flash message a response is carrying, if any.
pub fn decode_flash_cookie(response: &TestResponse) -> Option<String> {
    response.headers().get_all(SET_COOKIE).iter().find_map(|value| {
        let raw = value.to_str().ok()?;
        let encoded = raw.strip_prefix(&format!("{FLASH_COOKIE}="))?.split(';').next()?;
        if encoded.is_empty() {
            return None;
        }
        let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    })
}
