//! Registration, login, logout and refresh-token rotation. Sessions are a JWT in an
//! HttpOnly cookie, paired with a single-use refresh token in a second cookie.

use crate::auth::cookie::{expired_cookies, read_cookie, refresh_cookie, session_cookie};
use crate::auth::jwt::{sign, Claims};
use crate::auth::password::{hash_password, verify_password};
use crate::config::AuthSettings;
use crate::entities::refresh_token;
use crate::entities::user::{self, public_user, Credentials};
use crate::error::AppError;
use crate::extractors::{Services, ValidJson};
use crate::repository::Row;
use crate::response::{created, no_content, ok, with_cookies};
use crate::service::CrudService;
use crate::sql::Filter;
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue},
    response::Response,
};
use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;

pub const BAD_CREDENTIALS: &str = "Login or password is incorrect";

fn text<'r>(row: &'r Row, field: &str) -> Result<&'r str, AppError> {
    row.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::Internal(format!("row has no '{}'", field)))
}

/// Sign an access token and store a fresh refresh token for `user_id`; returns both cookies.
async fn start_session(
    settings: &AuthSettings,
    tokens: &CrudService,
    user_id: &str,
) -> Result<Vec<HeaderValue>, AppError> {
    let access = sign(&Claims::for_user(user_id, settings.token_ttl_secs), &settings.jwt_secret)?;
    let refresh = refresh_token::generate();
    tokens
        .create(refresh_token::new_row(user_id, &refresh, settings.refresh_ttl_secs, Utc::now()))
        .await?
        .ok_or_else(|| AppError::Internal("refresh token was not stored".into()))?;
    Ok(vec![session_cookie(settings, &access)?, refresh_cookie(settings, &refresh)?])
}

fn revoked() -> Row {
    let mut row = Map::new();
    row.insert("revoked".into(), Value::Bool(true));
    row
}

/// The user row and its first refresh token are written together.
pub async fn register(
    State(settings): State<Arc<AuthSettings>>,
    services: Services,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Response, AppError> {
    let hash = hash_password(credentials.password, settings.bcrypt_cost).await?;
    let mut payload = Map::new();
    payload.insert("email".into(), Value::String(credentials.email));
    payload.insert("hash".into(), Value::String(hash));

    let tx = services.transaction().await?;
    let inserted = tx
        .service(user::TABLE)?
        .create(payload)
        .await?
        .ok_or(AppError::Conflict(None))?;
    let cookies = start_session(&settings, tx.service(refresh_token::TABLE)?, text(&inserted, "id")?).await?;
    tx.commit().await?;
    tracing::info!(user_id = ?inserted.get("id"), "user registered");
    Ok(with_cookies(created(public_user(inserted)), cookies))
}

pub async fn login(
    State(settings): State<Arc<AuthSettings>>,
    services: Services,
    ValidJson(credentials): ValidJson<Credentials>,
) -> Result<Response, AppError> {
    let user = services
        .service(user::TABLE)?
        .find_one(&Filter::eq("email", credentials.email.as_str()))
        .await?
        .ok_or_else(|| AppError::Unauthorized(Some(BAD_CREDENTIALS.into())))?;

    let hash = text(&user, "hash")?.to_string();
    if !verify_password(credentials.password, hash).await? {
        return Err(AppError::Unauthorized(Some(BAD_CREDENTIALS.into())));
    }
    let cookies = start_session(&settings, services.service(refresh_token::TABLE)?, text(&user, "id")?).await?;
    Ok(with_cookies(ok(public_user(user)), cookies))
}

/// Clears both cookies and revokes the presented refresh token, if any.
pub async fn logout(
    State(settings): State<Arc<AuthSettings>>,
    services: Services,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let Some(token) = read_cookie(&headers, &settings.refresh_cookie_name) {
        services
            .service(refresh_token::TABLE)?
            .update(revoked(), &refresh_token::redeemable(&token))
            .await?;
    }
    Ok(with_cookies(no_content(), expired_cookies(&settings)?))
}

/// Trade a live refresh token for a new session. Revoking the old token and storing its
/// successor happen in one transaction: if either fails, the old token stays usable.
pub async fn refresh(
    State(settings): State<Arc<AuthSettings>>,
    services: Services,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let presented = read_cookie(&headers, &settings.refresh_cookie_name).ok_or(AppError::Unauthorized(None))?;

    let tx = services.transaction().await?;
    let tokens = tx.service(refresh_token::TABLE)?;
    // conditional on `revoked = false`, so a concurrent rotation of the same token matches nothing
    let now = Utc::now();
    let current = tokens
        .update(revoked(), &refresh_token::redeemable(&presented))
        .await?
        .into_iter()
        .next()
        .filter(|row| refresh_token::is_current(row, now))
        .ok_or(AppError::Unauthorized(None))?;
    let user_id = text(&current, "userId")?;
    let cookies = start_session(&settings, tokens, user_id).await?;
    tx.commit().await?;
    tracing::info!(user_id, "refresh token rotated");
    Ok(with_cookies(no_content(), cookies))
}
