//! Schema/example pairs describing the problem documents an endpoint can emit.
//!
//! Each schema pins `code`, `status`, `title` and `detail` to the single values the
//! endpoint produces, so two docs for different codes never share a schema.

use super::code::ProblemCode;
use super::document::Problem;
use super::source::{ValidationIssue, ValidationTarget};
use crate::service::Validated;
use serde::Serialize;
use utoipa::openapi::{ArrayBuilder, ObjectBuilder, RefOr, Schema, Type};

const EXAMPLE_REQUEST_ID: &str = "9b2e6c1a-6f4d-4a51-8d0e-0f3c2b7e5a41";

#[derive(Clone, Serialize)]
pub struct ProblemDoc {
    pub code: ProblemCode,
    pub status: u16,
    pub schema: RefOr<Schema>,
    pub example: Problem,
}

fn literal_string(value: &str) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .enum_values(Some([value]))
}

fn string() -> ObjectBuilder {
    ObjectBuilder::new().schema_type(Type::String)
}

/// Object schema for `code` with every member required and the fixed ones pinned.
fn problem_object(code: ProblemCode, detail: &str) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("code", literal_string(code.as_str()))
        .required("code")
        .property(
            "status",
            ObjectBuilder::new()
                .schema_type(Type::Integer)
                .enum_values(Some([code.status().as_u16()])),
        )
        .required("status")
        .property("title", literal_string(code.title()))
        .required("title")
        .property("detail", literal_string(detail))
        .required("detail")
        .property("instance", string())
        .required("instance")
        .property("requestId", string())
        .required("requestId")
}

/// Shape of one `errors` entry: a body pointer, or `{in, key}` for the other targets.
fn field_error_object(target: ValidationTarget) -> ObjectBuilder {
    let source = if target.is_body_like() {
        ObjectBuilder::new()
            .schema_type(Type::Object)
            .property("pointer", string())
            .required("pointer")
    } else {
        ObjectBuilder::new()
            .schema_type(Type::Object)
            .property("in", literal_string(target.as_str()))
            .required("in")
            .property("key", string())
            .required("key")
    };
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .property("source", source)
        .required("source")
        .property("detail", string())
        .required("detail")
}

fn example_value(example: &Problem) -> serde_json::Value {
    serde_json::to_value(example).unwrap_or_default()
}

/// Schema and example for a plain problem raised at `instance`. `message` replaces the
/// fixed detail text in both.
pub fn problem_doc(code: ProblemCode, instance: &str, message: Option<&str>) -> ProblemDoc {
    let example = Problem::new(code, instance, EXAMPLE_REQUEST_ID, message);
    let schema = problem_object(code, message.unwrap_or(code.detail())).examples([example_value(&example)]);
    ProblemDoc {
        code,
        status: code.status().as_u16(),
        schema: schema.into(),
        example,
    }
}

/// Issues a failed check of `T` would report: every required field, else the first
/// declared field, else the value as a whole.
fn example_issues<T: Validated>() -> Vec<ValidationIssue> {
    let schema = T::schema();
    let required: Vec<ValidationIssue> = schema
        .fields()
        .filter(|(_, rule)| rule.required == Some(true))
        .map(|(name, _)| ValidationIssue::new(name, "is required"))
        .collect();
    if !required.is_empty() {
        return required;
    }
    let issues = match schema.fields().next() {
        Some((name, _)) => vec![ValidationIssue::new(name, "is invalid")],
        None => vec![ValidationIssue::root("must be a JSON object")],
    };
    issues
}

/// Validation problem for request type `T` checked against `target`. The schema
/// requires a non-empty `errors` array whose sources match the target.
pub fn validation_problem_doc<T: Validated>(
    code: ProblemCode,
    instance: &str,
    target: ValidationTarget,
) -> ProblemDoc {
    let example = Problem::validation(code, instance, EXAMPLE_REQUEST_ID, target, &example_issues::<T>());
    let schema = problem_object(code, code.detail())
        .property(
            "errors",
            ArrayBuilder::new()
                .items(field_error_object(target))
                .min_items(Some(1)),
        )
        .required("errors")
        .examples([example_value(&example)]);
    ProblemDoc {
        code,
        status: code.status().as_u16(),
        schema: schema.into(),
        example,
    }
}

/// One entry per code in the closed set, raised at the root path.
pub fn catalog() -> Vec<ProblemDoc> {
    ProblemCode::ALL
        .iter()
        .map(|code| problem_doc(*code, "/", None))
        .collect()
}
