//! Fixed triage tables: PostgreSQL SQLSTATE and HTTP status to problem code.

use super::code::ProblemCode;
use axum::http::StatusCode;

/// Map a SQLSTATE to a problem code. Unknown or missing codes are internal.
pub fn classify_sqlstate(code: Option<&str>) -> ProblemCode {
    match code.unwrap_or("") {
        // string_data_right_truncation, numeric_value_out_of_range, invalid_text_representation
        "22001" | "22003" | "22P02" => ProblemCode::BadRequest,
        // not_null_violation, foreign_key_violation, check_violation
        "23502" | "23503" | "23514" => ProblemCode::UnprocessableEntity,
        // unique_violation
        "23505" => ProblemCode::Conflict,
        _ => ProblemCode::InternalServerError,
    }
}

/// Map an HTTP status to a problem code. The flag is false when the status is outside the
/// closed set and was degraded to internal.
pub fn classify_status(status: StatusCode) -> (ProblemCode, bool) {
    match ProblemCode::from_status(status) {
        Some(code) => (code, true),
        None => (ProblemCode::InternalServerError, false),
    }
}
