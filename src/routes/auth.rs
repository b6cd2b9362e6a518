use crate::handlers::auth::{login, logout, refresh, register};
use crate::state::AppState;
use axum::{routing::post, Router};

/// POST /register, /login, /logout, /refresh-token.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/refresh-token", post(refresh))
}
