//! One-shot flash messages.
//!
//! POST handlers answer with a `303 See Other` redirect and stash their
//! outcome message in a short-lived cookie; the next page load consumes and
//! clears it. Messages are base64-encoded so arbitrary punctuation survives
//! the cookie grammar.

use crate::api::cookies::get_cookie;
use anyhow::Context;
use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

pub const FLASH_COOKIE: &str = "flash";

/// `Set-Cookie` value carrying a flash message to the next request.
pub fn flash_cookie(message: &str) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(message.as_bytes());
    format!("{FLASH_COOKIE}={encoded}; Path=/; HttpOnly; SameSite=Strict")
}

/// `Set-Cookie` value clearing the flash cookie.
pub fn clear_flash_cookie() -> String {
    format!("{FLASH_COOKIE}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0")
}

/// Decode and remove the pending flash message, if any. The second element is
/// the clearing `Set-Cookie` value the response should carry when a message
/// was consumed.
pub fn take_flash(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    match get_cookie(headers, FLASH_COOKIE) {
        Some(value) => {
            let message = URL_SAFE_NO_PAD
                .decode(value.as_bytes())
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            (message, Some(clear_flash_cookie()))
        }
        None => (None, None),
    }
}

/// `303 See Other` redirect with a flash message attached.
pub fn redirect_with_flash(location: &str, message: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, location.to_string()),
            (header::SET_COOKIE, flash_cookie(message)),
        ],
    )
        .into_response()
}

/// Plain `303 See Other` redirect.
pub fn redirect(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

/// Attach an extra `Set-Cookie` header to an already built response.
pub fn with_set_cookie(mut response: Response, cookie: &str) -> anyhow::Result<Response> {
    let value = axum::http::HeaderValue::from_str(cookie).context("invalid Set-Cookie value")?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}
