//! Minimal request-cookie parsing.

use axum::http::{header, HeaderMap};

/// Value of the named cookie, if present. Clients may split cookies across
/// multiple `Cookie` headers, so every header is scanned.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(header::COOKIE).iter().find_map(|header| {
        let raw = header.to_str().ok()?;
        raw.split(';').find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
    })
}
