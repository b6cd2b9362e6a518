use crate::auth::{cookie::read_cookie, jwt::verify};
use crate::config::AuthSettings;
use crate::error::AppError;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::sync::Arc;

/// Require a valid session cookie; the decoded [`Claims`](crate::auth::Claims) go into request extensions.
pub async fn require_auth(
    State(settings): State<Arc<AuthSettings>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = read_cookie(req.headers(), &settings.cookie_name).ok_or(AppError::Unauthorized(None))?;
    let claims = verify(&token, &settings.jwt_secret)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
