//! Extractors that validate request parts against a [`Validated`] schema before the handler runs.

use crate::error::AppError;
use crate::problem::{ValidationIssue, ValidationTarget};
use crate::service::{coerce_strings, RequestValidator, Validated};
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// JSON body, all required fields present.
pub struct ValidJson<T>(pub T);

/// JSON body for partial updates: only present fields are checked, at least one required.
pub struct ValidPatch<T>(pub T);

pub struct ValidQuery<T>(pub T);

pub struct ValidPath<T>(pub T);

fn finish<T: DeserializeOwned>(
    target: ValidationTarget,
    fields: Map<String, Value>,
    issues: Vec<ValidationIssue>,
) -> Result<T, AppError> {
    if !issues.is_empty() {
        return Err(AppError::validation(target, issues));
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::validation(target, vec![ValidationIssue::root(e.to_string())]))
}

async fn json_object<S: Send + Sync>(req: Request, state: &S) -> Result<Map<String, Value>, AppError> {
    let Json(value) = Json::<Value>::from_request(req, state).await?;
    match value {
        Value::Object(body) => Ok(body),
        _ => Err(AppError::validation(
            ValidationTarget::Json,
            vec![ValidationIssue::root("must be a JSON object")],
        )),
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validated,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = json_object(req, state).await?;
        let issues = RequestValidator::validate(&body, &T::schema());
        finish(ValidationTarget::Json, body, issues).map(ValidJson)
    }
}

#[async_trait]
impl<S, T> FromRequest<S> for ValidPatch<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validated,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = json_object(req, state).await?;
        let issues = RequestValidator::validate_partial(&body, &T::schema());
        finish(ValidationTarget::Json, body, issues).map(ValidPatch)
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validated,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(Some(e.body_text())))?;
        let schema = T::schema();
        let fields = coerce_strings(raw, &schema);
        let issues = RequestValidator::validate(&fields, &schema);
        finish(ValidationTarget::Query, fields, issues).map(ValidQuery)
    }
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validated,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(Some(e.body_text())))?;
        let schema = T::schema();
        let fields = coerce_strings(raw, &schema);
        let issues = RequestValidator::validate(&fields, &schema);
        finish(ValidationTarget::Param, fields, issues).map(ValidPath)
    }
}
