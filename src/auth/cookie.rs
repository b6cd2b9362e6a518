//! Session and refresh cookies: built and parsed with the `cookie` crate.

use crate::config::AuthSettings;
use crate::error::AppError;
use axum::http::{header, HeaderMap, HeaderValue};
use cookie::{time::Duration, Cookie, SameSite};

fn base<'c>(settings: &AuthSettings, name: &'c str, value: &'c str) -> Cookie<'c> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(settings.secure_cookie)
        .path("/")
        .build()
}

fn header_value(cookie: &Cookie<'_>) -> Result<HeaderValue, AppError> {
    HeaderValue::from_str(&cookie.encoded().to_string())
        .map_err(|e| AppError::Internal(format!("cookie '{}' is not a valid header: {}", cookie.name(), e)))
}

fn live(settings: &AuthSettings, name: &str, value: &str, ttl_secs: u64) -> Result<HeaderValue, AppError> {
    let mut cookie = base(settings, name, value);
    cookie.set_max_age(Duration::seconds(ttl_secs as i64));
    header_value(&cookie)
}

/// `Set-Cookie` carrying the access token.
pub fn session_cookie(settings: &AuthSettings, token: &str) -> Result<HeaderValue, AppError> {
    live(settings, &settings.cookie_name, token, settings.token_ttl_secs)
}

/// `Set-Cookie` carrying the refresh token.
pub fn refresh_cookie(settings: &AuthSettings, token: &str) -> Result<HeaderValue, AppError> {
    live(settings, &settings.refresh_cookie_name, token, settings.refresh_ttl_secs)
}

/// Removal cookies for both the session and the refresh token.
pub fn expired_cookies(settings: &AuthSettings) -> Result<Vec<HeaderValue>, AppError> {
    [settings.cookie_name.as_str(), settings.refresh_cookie_name.as_str()]
        .into_iter()
        .map(|name| {
            let mut cookie = base(settings, name, "");
            cookie.make_removal();
            header_value(&cookie)
        })
        .collect()
}

/// Value of cookie `name` from the request's `Cookie` headers. Malformed pairs are skipped.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|c| c.name() == name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}
