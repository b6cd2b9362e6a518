use crate::auth::require_auth;
use crate::handlers::tasks::{create, get_one, list, patch, remove};
use crate::state::AppState;
use axum::{middleware::from_fn_with_state, routing::get, Router};

/// Task CRUD; every route requires a session cookie.
pub fn task_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list).post(create))
        .route("/tasks/:id", get(get_one).patch(patch).delete(remove))
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth))
}
