//! Validation targets and per-field error entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The part of a request a schema check was applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTarget {
    Json,
    Form,
    Query,
    Param,
    Header,
}

impl ValidationTarget {
    /// JSON and form bodies are addressed by pointer; everything else by key.
    pub fn is_body_like(self) -> bool {
        matches!(self, ValidationTarget::Json | ValidationTarget::Form)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ValidationTarget::Json => "json",
            ValidationTarget::Form => "form",
            ValidationTarget::Query => "query",
            ValidationTarget::Param => "param",
            ValidationTarget::Header => "header",
        }
    }
}

impl fmt::Display for ValidationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One schema violation: the path to the offending value and what is wrong with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: Vec<String>,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: vec![path.into()],
            message: message.into(),
        }
    }

    /// Issue about the value as a whole (e.g. body is not an object).
    pub fn root(message: impl Into<String>) -> Self {
        ValidationIssue {
            path: Vec::new(),
            message: message.into(),
        }
    }
}

/// Location of a non-body parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Param,
    Header,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorSource {
    Pointer {
        pointer: String,
    },
    Parameter {
        #[serde(rename = "in")]
        location: ParamLocation,
        key: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub source: ErrorSource,
    pub detail: String,
}

impl FieldError {
    pub fn from_issue(target: ValidationTarget, issue: &ValidationIssue) -> Self {
        let source = match target {
            ValidationTarget::Json | ValidationTarget::Form => ErrorSource::Pointer {
                pointer: body_pointer(&issue.path),
            },
            ValidationTarget::Query => parameter(ParamLocation::Query, &issue.path),
            ValidationTarget::Param => parameter(ParamLocation::Param, &issue.path),
            ValidationTarget::Header => parameter(ParamLocation::Header, &issue.path),
        };
        FieldError {
            source,
            detail: issue.message.clone(),
        }
    }
}

fn body_pointer(path: &[String]) -> String {
    let mut pointer = String::from("/body");
    for segment in path {
        pointer.push('/');
        // RFC 6901 escaping
        pointer.push_str(&segment.replace('~', "~0").replace('/', "~1"));
    }
    pointer
}

fn parameter(location: ParamLocation, path: &[String]) -> ErrorSource {
    ErrorSource::Parameter {
        location,
        key: path.join("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_issue_becomes_pointer() {
        let e = FieldError::from_issue(ValidationTarget::Json, &ValidationIssue::new("name", "Required"));
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({ "source": { "pointer": "/body/name" }, "detail": "Required" })
        );
    }

    #[test]
    fn query_issue_becomes_in_and_key() {
        let e = FieldError::from_issue(ValidationTarget::Query, &ValidationIssue::new("limit", "too big"));
        assert_eq!(
            serde_json::to_value(&e).unwrap(),
            json!({ "source": { "in": "query", "key": "limit" }, "detail": "too big" })
        );
    }

    #[test]
    fn root_issue_points_at_body() {
        let e = FieldError::from_issue(ValidationTarget::Form, &ValidationIssue::root("expected object"));
        assert_eq!(e.source, ErrorSource::Pointer { pointer: "/body".into() });
    }

    #[test]
    fn pointer_segments_are_escaped() {
        let issue = ValidationIssue {
            path: vec!["a/b".into(), "c~d".into()],
            message: "x".into(),
        };
        let e = FieldError::from_issue(ValidationTarget::Json, &issue);
        assert_eq!(e.source, ErrorSource::Pointer { pointer: "/body/a~1b/c~0d".into() });
    }
}
