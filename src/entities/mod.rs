//! Concrete tables and their request shapes.

pub mod refresh_token;
pub mod task;
pub mod user;

use crate::config::{TableConfig, ValidationRule};
use crate::error::AppError;
use crate::repository::Row;
use crate::service::{RequestSchema, Validated};
use serde::{Deserialize, Serialize};

pub fn tables() -> Vec<TableConfig> {
    vec![user::table(), task::table(), refresh_token::table()]
}

/// `{id}` path segment; must be a UUID.
#[derive(Clone, Debug, Deserialize)]
pub struct IdParam {
    pub id: String,
}

impl Validated for IdParam {
    fn schema() -> RequestSchema {
        RequestSchema::new().field("id", ValidationRule::string().required().format("uuid"))
    }
}

/// Serialize a request shape into a write payload.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row, AppError> {
    match serde_json::to_value(value) {
        Ok(serde_json::Value::Object(row)) => Ok(row),
        Ok(_) => Err(AppError::Internal("payload did not serialize to an object".into())),
        Err(e) => Err(AppError::Internal(format!("payload serialization failed: {}", e))),
    }
}
