//! Typed errors and their hand-off to the problem pipeline.

use crate::problem::{Failure, ProblemCode, ValidationIssue, ValidationTarget};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("table {table}: unknown field '{field}'")]
    UnknownField { table: String, field: String },
    #[error("table {table}: base field '{field}' is not writable")]
    BaseFieldWrite { table: String, field: String },
    #[error("table {table}: missing base column '{column}'")]
    MissingBaseColumn { table: String, column: String },
    #[error("duplicate table: {0}")]
    DuplicateTable(String),
    #[error("table {table}: duplicate column '{column}'")]
    DuplicateColumn { table: String, column: String },
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),
    #[error("no service registered for table '{0}'")]
    UnknownTable(String),
    #[error("env {key}: {message}")]
    Env { key: &'static str, message: String },
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found")]
    NotFound(Option<String>),
    #[error("unauthorized")]
    Unauthorized(Option<String>),
    #[error("conflict")]
    Conflict(Option<String>),
    #[error("bad request")]
    BadRequest(Option<String>),
    #[error("validation failed on {target}: {} issue(s)", .issues.len())]
    Validation {
        target: ValidationTarget,
        issues: Vec<ValidationIssue>,
    },
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("http {status}: {message}")]
    Http { status: StatusCode, message: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(target: ValidationTarget, issues: Vec<ValidationIssue>) -> Self {
        AppError::Validation { target, issues }
    }

    /// Classification handed to the problem middleware.
    pub fn to_failure(&self) -> Failure {
        match self {
            AppError::NotFound(m) => Failure::domain(ProblemCode::NotFound, m.clone()),
            AppError::Unauthorized(m) => Failure::domain(ProblemCode::Unauthorized, m.clone()),
            AppError::Conflict(m) => Failure::domain(ProblemCode::Conflict, m.clone()),
            AppError::BadRequest(m) => Failure::domain(ProblemCode::BadRequest, m.clone()),
            AppError::Validation { target, issues } => Failure::Validation {
                target: *target,
                issues: issues.clone(),
            },
            AppError::Db(e) => Failure::Database {
                sqlstate: sqlstate(e),
                message: e.to_string(),
            },
            AppError::Http { status, message } => Failure::Http {
                status: *status,
                message: message.clone(),
            },
            AppError::Config(_) | AppError::Internal(_) => Failure::Unknown {
                message: self.to_string(),
            },
        }
    }
}

/// SQLSTATE of a database-originated error, if any.
pub fn sqlstate(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
        _ => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let failure = self.to_failure();
        let status = failure.provisional_status();
        let mut response = status.into_response();
        response.extensions_mut().insert(failure);
        response
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        use axum::extract::rejection::JsonRejection;
        match rejection {
            JsonRejection::MissingJsonContentType(r) => AppError::BadRequest(Some(r.body_text())),
            JsonRejection::JsonSyntaxError(r) => AppError::BadRequest(Some(r.body_text())),
            other => AppError::Http {
                status: other.status(),
                message: other.body_text(),
            },
        }
    }
}
