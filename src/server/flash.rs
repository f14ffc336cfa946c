//! One-shot flash messages carried across a redirect in a cookie.
//!
//! The cookie holds a JSON array of strings, base64url-encoded so it is a
//! valid cookie value whatever the messages contain.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

pub const FLASH_COOKIE: &str = "fileconv_flash";

fn encode(messages: &[String]) -> String {
    let json = serde_json::to_string(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

fn decode(value: &str) -> Vec<String> {
    URL_SAFE_NO_PAD
        .decode(value)
        .ok()
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}

/// Queue `message` for the next page view.
pub fn push(jar: CookieJar, message: &str) -> CookieJar {
    let mut messages = jar.get(FLASH_COOKIE).map(|c| decode(c.value())).unwrap_or_default();
    messages.push(message.to_string());
    let cookie = Cookie::build((FLASH_COOKIE, encode(&messages)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    jar.add(cookie)
}

/// Take every queued message, clearing the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<String>) {
    let Some(value) = jar.get(FLASH_COOKIE).map(|c| c.value().to_string()) else {
        return (jar, Vec::new());
    };
    let cleared = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/"));
    (cleared, decode(&value))
}
