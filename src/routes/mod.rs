//! Router assembly and the global layer stack.

mod auth;
mod common;
mod tasks;

pub use auth::auth_routes;
pub use common::common_routes;
pub use tasks::task_routes;

use crate::error::AppError;
use crate::problem::{panic_to_problem, render_problems};
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, middleware::from_fn, Extension, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

async fn not_found() -> AppError {
    AppError::NotFound(None)
}

/// Every route the API serves, before global layers.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(common_routes())
        .merge(auth_routes())
        .merge(task_routes(state))
        .fallback(not_found)
}

/// Wrap routes in the global stack: request ids, tracing, problem rendering, panic
/// capture, body limit, and the service registry extension.
pub fn with_middleware(routes: Router<AppState>, state: AppState, body_limit_bytes: usize) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(from_fn(render_problems))
        .layer(CatchPanicLayer::custom(panic_to_problem))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit_bytes))
        .layer(Extension(state.registry.clone()));

    routes.layer(middleware).with_state(state)
}

pub fn build_app(state: AppState, body_limit_bytes: usize) -> Router {
    with_middleware(api_routes(&state), state, body_limit_bytes)
}
