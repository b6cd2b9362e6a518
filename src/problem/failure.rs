//! Failure classification and logging: every failed request passes through here once.

use super::code::ProblemCode;
use super::context::RequestContext;
use super::document::Problem;
use super::source::{ValidationIssue, ValidationTarget};
use super::triage::{classify_sqlstate, classify_status};
use axum::http::StatusCode;

/// A failure waiting to be rendered. Attached to responses by `AppError` and read by the
/// problem middleware.
#[derive(Clone, Debug)]
pub enum Failure {
    /// Relational store error, carrying its SQLSTATE.
    Database { sqlstate: Option<String>, message: String },
    /// Framework-level error with an HTTP status.
    Http { status: StatusCode, message: String },
    /// Request shape failed its schema.
    Validation {
        target: ValidationTarget,
        issues: Vec<ValidationIssue>,
    },
    /// Problem chosen by a handler, optionally with a client-facing message.
    Domain { code: ProblemCode, message: Option<String> },
    /// Anything else, including panics.
    Unknown { message: String },
}

impl Failure {
    pub fn domain(code: ProblemCode, message: Option<String>) -> Self {
        Failure::Domain { code, message }
    }

    pub fn code(&self) -> ProblemCode {
        match self {
            Failure::Database { sqlstate, .. } => classify_sqlstate(sqlstate.as_deref()),
            Failure::Http { status, .. } => classify_status(*status).0,
            Failure::Validation { .. } => ProblemCode::UnprocessableEntity,
            Failure::Domain { code, .. } => *code,
            Failure::Unknown { .. } => ProblemCode::InternalServerError,
        }
    }

    /// Status the response carries before the middleware renders the body.
    pub fn provisional_status(&self) -> StatusCode {
        self.code().status()
    }

    /// Log the failure with request context and build the problem document.
    pub fn into_problem(self, ctx: &RequestContext) -> Problem {
        let code = self.code();
        let request_id = ctx.request_id.as_str();
        let method = ctx.method.as_str();
        let path = ctx.instance.as_str();
        match self {
            Failure::Database { sqlstate, message } => {
                tracing::warn!(
                    request_id, method, path, sqlstate = ?sqlstate, problem = %code, error = %message,
                    "handled database error"
                );
                Problem::new(code, path, request_id, None)
            }
            Failure::Http { status, message } => {
                let (_, known) = classify_status(status);
                if !known {
                    tracing::error!(
                        request_id, method, path, status = status.as_u16(), error = %message,
                        "unmapped http status"
                    );
                } else if status.is_server_error() {
                    tracing::error!(request_id, method, path, status = status.as_u16(), error = %message, "handled http error");
                } else {
                    tracing::warn!(request_id, method, path, status = status.as_u16(), error = %message, "handled http error");
                }
                Problem::new(code, path, request_id, None)
            }
            Failure::Validation { target, issues } => {
                tracing::debug!(request_id, method, path, %target, issues = issues.len(), "request validation failed");
                Problem::validation(code, path, request_id, target, &issues)
            }
            Failure::Domain { code, message } => {
                if code.status().is_server_error() {
                    tracing::error!(request_id, method, path, problem = %code, "handler returned server problem");
                } else {
                    tracing::debug!(request_id, method, path, problem = %code, "handler returned problem");
                }
                Problem::new(code, path, request_id, message.as_deref())
            }
            Failure::Unknown { message } => {
                tracing::error!(request_id, method, path, error = %message, "unhandled error caught");
                Problem::new(code, path, request_id, None)
            }
        }
    }
}
