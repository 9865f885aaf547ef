//! Stateless browser sessions carried in a signed JWT cookie.
//!
//! The cookie is HttpOnly and SameSite=Strict; `Secure` is configurable so
//! local plain-HTTP development still works. There is no server-side session
//! store: logout simply clears the cookie and expiry is enforced by the
//! token's `exp` claim.

use crate::api::models::users::{CurrentUser, Role};
use crate::types::UserId;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const SESSION_COOKIE: &str = "session";

/// Claims embedded in the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: UserId,
    pub username: String,
    pub role: Role,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        CurrentUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// Mint a session token for a freshly authenticated user.
pub fn create_session_token(
    user_id: UserId,
    username: &str,
    role: Role,
    secret: &str,
    lifetime: Duration,
) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user_id,
        username: username.to_string(),
        role,
        iat: now,
        exp: now + lifetime.as_secs() as i64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to sign session token")
}

/// Verify a session token's signature and expiry.
pub fn verify_session_token(token: &str, secret: &str) -> Result<SessionClaims> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("invalid session token")?;
    Ok(data.claims)
}

/// `Set-Cookie` value installing the session cookie.
pub fn session_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value removing the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
