//! Emitting problems: `application/problem+json` responses, the global middleware, and the
//! panic handler.

use super::code::ProblemCode;
use super::context::RequestContext;
use super::document::Problem;
use super::failure::Failure;
use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

pub const PROBLEM_CONTENT_TYPE: &str = "application/problem+json";

pub struct ProblemResponse(pub Problem);

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match serde_json::to_vec(&self.0) {
            Ok(body) => (
                status,
                [(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_CONTENT_TYPE))],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, "problem serialization failed");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Short-circuit from a handler with a specific problem, without going through `AppError`.
pub fn respond(ctx: &RequestContext, code: ProblemCode, message: Option<&str>) -> Response {
    ProblemResponse(Problem::new(code, ctx.instance.clone(), ctx.request_id.clone(), message)).into_response()
}

/// Problem documents and deliberate JSON error bodies (e.g. readiness) pass through as is.
fn has_json_body(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with(PROBLEM_CONTENT_TYPE) || v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Global error interceptor. Renders any `Failure` attached to the response; error
/// responses without a JSON body (unmatched method, body limit, ...) are classified by
/// status.
pub async fn render_problems(req: Request, next: Next) -> Response {
    let ctx = RequestContext::new(req.method().clone(), req.uri().path(), req.headers());
    let mut response = next.run(req).await;
    let failure = match response.extensions_mut().remove::<Failure>() {
        Some(f) => f,
        None if response.status().is_client_error() || response.status().is_server_error() => {
            if has_json_body(&response) {
                return response;
            }
            let status = response.status();
            Failure::Http {
                status,
                message: status.canonical_reason().unwrap_or("unknown status").to_string(),
            }
        }
        None => return response,
    };
    let mut rendered = ProblemResponse(failure.into_problem(&ctx)).into_response();
    if let Some(id) = response.headers().get(super::context::REQUEST_ID_HEADER) {
        rendered
            .headers_mut()
            .insert(super::context::REQUEST_ID_HEADER, id.clone());
    }
    rendered
}

/// `CatchPanicLayer` handler: a panic is an unclassified failure.
pub fn panic_to_problem(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic with non-string payload".to_string()
    };
    let failure = Failure::Unknown {
        message: format!("panic: {}", message),
    };
    let mut response = failure.provisional_status().into_response();
    response.extensions_mut().insert(failure);
    response
}
