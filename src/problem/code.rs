//! Closed set of problem codes and the fixed code -> status / title / detail tables.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProblemCode {
    BadRequest,
    Unauthorized,
    NotFound,
    Conflict,
    UnprocessableEntity,
    InternalServerError,
}

impl ProblemCode {
    pub const ALL: [ProblemCode; 6] = [
        ProblemCode::BadRequest,
        ProblemCode::Unauthorized,
        ProblemCode::NotFound,
        ProblemCode::Conflict,
        ProblemCode::UnprocessableEntity,
        ProblemCode::InternalServerError,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProblemCode::BadRequest => "BAD_REQUEST",
            ProblemCode::Unauthorized => "UNAUTHORIZED",
            ProblemCode::NotFound => "NOT_FOUND",
            ProblemCode::Conflict => "CONFLICT",
            ProblemCode::UnprocessableEntity => "UNPROCESSABLE_ENTITY",
            ProblemCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            ProblemCode::BadRequest => StatusCode::BAD_REQUEST,
            ProblemCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ProblemCode::NotFound => StatusCode::NOT_FOUND,
            ProblemCode::Conflict => StatusCode::CONFLICT,
            ProblemCode::UnprocessableEntity => StatusCode::UNPROCESSABLE_ENTITY,
            ProblemCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ProblemCode::BadRequest => "Bad Request",
            ProblemCode::Unauthorized => "Unauthorized",
            ProblemCode::NotFound => "Not Found",
            ProblemCode::Conflict => "Conflict",
            ProblemCode::UnprocessableEntity => "Unprocessable Entity",
            ProblemCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Human-readable detail used when the caller supplies no message.
    pub fn detail(self) -> &'static str {
        match self {
            ProblemCode::BadRequest => "Your request is malformed or missing required fields.",
            ProblemCode::Unauthorized => "You are not authorized to perform this action.",
            ProblemCode::NotFound => "The requested resource was not found.",
            ProblemCode::Conflict => "The request conflicts with the current state of the resource.",
            ProblemCode::UnprocessableEntity => "Validation failed for the request payload.",
            ProblemCode::InternalServerError => "An unexpected error occurred on the server.",
        }
    }

    /// Inverse of [`ProblemCode::status`]; `None` for statuses outside the closed set.
    pub fn from_status(status: StatusCode) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.status() == status)
    }
}

impl fmt::Display for ProblemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn status_and_title_are_one_to_one() {
        let statuses: HashSet<_> = ProblemCode::ALL.iter().map(|c| c.status()).collect();
        let titles: HashSet<_> = ProblemCode::ALL.iter().map(|c| c.title()).collect();
        assert_eq!(statuses.len(), ProblemCode::ALL.len());
        assert_eq!(titles.len(), ProblemCode::ALL.len());
        for code in ProblemCode::ALL {
            assert_eq!(ProblemCode::from_status(code.status()), Some(code));
            assert_eq!(code.title(), code.status().canonical_reason().unwrap_or_default());
        }
    }

    #[test]
    fn statuses_outside_the_set_are_unmapped() {
        assert_eq!(ProblemCode::from_status(StatusCode::METHOD_NOT_ALLOWED), None);
        assert_eq!(ProblemCode::from_status(StatusCode::PAYLOAD_TOO_LARGE), None);
    }

    #[test]
    fn serializes_as_screaming_snake_case() {
        let v = serde_json::to_value(ProblemCode::UnprocessableEntity).unwrap();
        assert_eq!(v, serde_json::json!("UNPROCESSABLE_ENTITY"));
        assert_eq!(ProblemCode::NotFound.to_string(), "NOT_FOUND");
    }
}
