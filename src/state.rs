//! Shared application state for all routes.

use crate::config::AuthSettings;
use crate::registry::ServiceRegistry;
use axum::extract::FromRef;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Built once at startup; also attached to every request as an extension.
    pub registry: Arc<ServiceRegistry>,
    pub auth: Arc<AuthSettings>,
}

impl FromRef<AppState> for Arc<AuthSettings> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

impl FromRef<AppState> for PgPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
