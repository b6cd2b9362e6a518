//! Process settings from environment variables (after `.env` is loaded by the binary).

use crate::error::ConfigError;
use std::str::FromStr;

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub body_limit_bytes: usize,
    pub auth: AuthSettings,
}

#[derive(Clone, Debug)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub cookie_name: String,
    pub refresh_cookie_name: String,
    /// Sets the `Secure` cookie attribute; off in development.
    pub secure_cookie: bool,
    pub token_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Env {
            key: "JWT_SECRET",
            message: "required".into(),
        })?;
        let app_env = get("APP_ENV").unwrap_or_else(|| "development".into());

        Ok(Settings {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/taskhub".into()),
            db_max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 5)?,
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".into()),
            body_limit_bytes: parse_or(&get, "BODY_LIMIT_BYTES", 1024 * 1024)?,
            auth: AuthSettings {
                jwt_secret,
                cookie_name: cookie_name_or(&get, "COOKIE_NAME", "token")?,
                refresh_cookie_name: cookie_name_or(&get, "REFRESH_COOKIE_NAME", "refresh_token")?,
                secure_cookie: !app_env.eq_ignore_ascii_case("development"),
                token_ttl_secs: parse_or(&get, "TOKEN_TTL_SECS", 24 * 60 * 60)?,
                refresh_ttl_secs: parse_or(&get, "REFRESH_TTL_SECS", 30 * 24 * 60 * 60)?,
                bcrypt_cost: parse_or(&get, "BCRYPT_COST", 12)?,
            },
        })
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Env {
            key,
            message: format!("invalid value '{}': {}", raw, e),
        }),
        None => Ok(default),
    }
}

/// RFC 6265 cookie-name token: visible ASCII without separators.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?={}".contains(&b))
}

fn cookie_name_or<G>(get: &G, key: &'static str, default: &str) -> Result<String, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(name) if is_cookie_token(&name) => Ok(name),
        Some(name) => Err(ConfigError::Env {
            key,
            message: format!("'{}' is not a valid cookie name", name),
        }),
        None => Ok(default.to_string()),
    }
}
