//! Login, logout and dashboard handlers.

use crate::api::flash::{redirect, redirect_with_flash, take_flash, with_set_cookie};
use crate::api::models::auth::{DashboardPage, LoginForm};
use crate::api::models::users::CurrentUser;
use crate::auth::password::verify_string;
use crate::auth::session::{clear_session_cookie, create_session_token, session_cookie};
use crate::db::errors::DbError;
use crate::db::models::users::UserDBResponse;
use crate::errors::Result;
use crate::AppState;
use anyhow::Context;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
    Form,
};
use serde_json::json;
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

/// `GET /` - everything of interest lives behind login.
pub async fn home() -> Response {
    redirect("/login")
}

/// `GET /login` - the login page payload, with any pending flash message.
pub async fn login_page(headers: HeaderMap) -> Result<Response> {
    let (flash, clear) = take_flash(&headers);
    let response = Json(json!({ "flash": flash })).into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}

/// `POST /login` - verify credentials and establish a session.
///
/// The failure message never reveals whether the username exists.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Response> {
    let username = form.username.trim().to_string();
    if username.is_empty() || form.password.is_empty() {
        return Ok(redirect_with_flash(
            "/login",
            "Please enter both username and password.",
        ));
    }

    let mut conn = state.conn().await?;
    let Some(user) = UserDBResponse::get_by_username(&mut conn, &username).await? else {
        info!(%username, "Login attempt for unknown username");
        return Ok(redirect_with_flash("/login", INVALID_CREDENTIALS));
    };

    // Argon2 verification is CPU-heavy; keep it off the async worker threads
    let password = form.password;
    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_string(&password, &stored_hash))
        .await
        .context("password verification task panicked")??;

    if !valid {
        warn!(%username, "Failed login attempt");
        return Ok(redirect_with_flash("/login", INVALID_CREDENTIALS));
    }

    UserDBResponse::touch_last_login(&mut conn, user.id).await?;

    let token = create_session_token(
        user.id,
        &user.username,
        user.role,
        &state.config.auth.secret_key,
        state.config.auth.session_lifetime,
    )?;
    let cookie = session_cookie(
        &token,
        state.config.auth.session_lifetime,
        state.config.auth.secure_cookies,
    );

    info!(%username, role = %user.role, "User logged in");
    Ok(with_set_cookie(redirect("/dashboard"), &cookie)?)
}

/// `GET /logout` - clear the session cookie.
///
/// Public route: an expired or absent session still gets the cookie cleared
/// and the logged-out message.
pub async fn logout(State(state): State<AppState>) -> Result<Response> {
    info!("User logged out");
    let response = redirect_with_flash("/login", "You have been logged out successfully.");
    Ok(with_set_cookie(
        response,
        &clear_session_cookie(state.config.auth.secure_cookies),
    )?)
}

/// `GET /dashboard` - headline counts for the landing page.
pub async fn dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
    headers: HeaderMap,
) -> Result<Response> {
    let mut conn = state.conn().await?;

    let total_customers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::from)?;
    let total_cars: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cars")
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::from)?;
    let total_services: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM services")
        .fetch_one(&mut *conn)
        .await
        .map_err(DbError::from)?;
    let pending_services: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM services WHERE status = 'Pending'")
            .fetch_one(&mut *conn)
            .await
            .map_err(DbError::from)?;

    let (flash, clear) = take_flash(&headers);
    let page = DashboardPage {
        username: user.username,
        role: user.role.to_string(),
        total_customers,
        total_cars,
        total_services,
        pending_services,
        flash,
    };
    let response = Json(page).into_response();
    match clear {
        Some(cookie) => Ok(with_set_cookie(response, &cookie)?),
        None => Ok(response),
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::users::Role;
    use crate::auth::session::SESSION_COOKIE;
    use crate::test_utils::{create_test_app, decode_flash_cookie, login_as, provision_user};
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn test_home_redirects_to_login(pool: SqlitePool) {
        let server = create_test_app(pool).await;
        let response = server.get("/").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_login_success_sets_session(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        provision_user(&pool, "admin", "admin-pass", Role::Admin).await;

        let response = server
            .post("/login")
            .form(&[("username", "admin"), ("password", "admin-pass")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/dashboard");
        assert!(response
            .header("set-cookie")
            .to_str()
            .unwrap()
            .starts_with(SESSION_COOKIE));

        // Session cookie persists in the test client; dashboard now loads
        let dashboard = server.get("/dashboard").await;
        dashboard.assert_status_ok();
        let body: Value = dashboard.json();
        assert_eq!(body["username"], "admin");
        assert_eq!(body["role"], "admin");
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        provision_user(&pool, "admin", "admin-pass", Role::Admin).await;

        let response = server
            .post("/login")
            .form(&[("username", "admin"), ("password", "wrong")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_login_unknown_user_same_shape_as_wrong_password(pool: SqlitePool) {
        let server = create_test_app(pool).await;
        let response = server
            .post("/login")
            .form(&[("username", "ghost"), ("password", "whatever")])
            .await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_login_updates_last_login(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        provision_user(&pool, "admin", "admin-pass", Role::Admin).await;
        login_as(&server, "admin", "admin-pass").await;

        let last_login: Option<String> =
            sqlx::query_scalar("SELECT last_login FROM users WHERE username = 'admin'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert!(last_login.is_some());
    }

    #[sqlx::test]
    async fn test_dashboard_requires_login(pool: SqlitePool) {
        let server = create_test_app(pool).await;
        let response = server.get("/dashboard").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_logout_clears_session(pool: SqlitePool) {
        let server = create_test_app(pool.clone()).await;
        provision_user(&pool, "admin", "admin-pass", Role::Admin).await;
        login_as(&server, "admin", "admin-pass").await;

        let response = server.get("/logout").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");

        let dashboard = server.get("/dashboard").await;
        dashboard.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(dashboard.header("location"), "/login");
    }

    #[sqlx::test]
    async fn test_logout_without_session(pool: SqlitePool) {
        let server = create_test_app(pool).await;

        // No login beforehand; the route still clears and flashes
        let response = server.get("/logout").await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), "/login");
        assert_eq!(
            decode_flash_cookie(&response).as_deref(),
            Some("You have been logged out successfully.")
        );
    }
}
