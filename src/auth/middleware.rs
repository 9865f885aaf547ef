//! Route guards.
//!
//! `require_login` verifies the session cookie and attaches the resulting
//! [`CurrentUser`] to the request; `require_admin` layers on top of it and
//! additionally checks the role. Failed checks answer with a browser redirect
//! and a flash message rather than a bare 401/403, since every guarded route
//! is a page or form target.

use crate::api::cookies::get_cookie;
use crate::api::flash::redirect_with_flash;
use crate::api::models::users::CurrentUser;
use crate::auth::session::{verify_session_token, SESSION_COOKIE};
use crate::errors::Error;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use tracing::debug;

pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in to access this page.";
pub const ADMIN_REQUIRED_MESSAGE: &str = "⚠️ Access Denied: This page requires administrator privileges. Please contact your system administrator if you need access.";

/// Reject unauthenticated requests with a redirect to the login page.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = get_cookie(request.headers(), SESSION_COOKIE);
    let claims = token
        .as_deref()
        .and_then(|t| match verify_session_token(t, &state.config.auth.secret_key) {
            Ok(claims) => Some(claims),
            Err(e) => {
                debug!("Rejected session cookie: {e:#}");
                None
            }
        });

    match claims {
        Some(claims) => {
            request.extensions_mut().insert(CurrentUser::from(claims));
            next.run(request).await
        }
        None => redirect_with_flash("/login", LOGIN_REQUIRED_MESSAGE),
    }
}

/// Reject non-admin users with a redirect back to the dashboard. Must be
/// layered inside [`require_login`] so the identity is already attached.
pub async fn require_admin(request: Request, next: Next) -> Response {
    match request.extensions().get::<CurrentUser>() {
        Some(user) if user.is_admin() => next.run(request).await,
        Some(user) => {
            debug!(username = %user.username, "Blocked non-admin access");
            redirect_with_flash("/dashboard", ADMIN_REQUIRED_MESSAGE)
        }
        // Misconfigured route stack; treat as unauthenticated
        None => redirect_with_flash("/login", LOGIN_REQUIRED_MESSAGE),
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(Error::Unauthenticated { message: None })
    }
}
