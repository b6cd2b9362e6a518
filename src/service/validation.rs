//! Request validation from field rules. Produces every issue found, not just the first.

use crate::config::{FieldKind, ValidationRule};
use crate::problem::ValidationIssue;
use regex::Regex;
use serde_json::{Map, Value};

/// Field rules for one request shape. Unknown keys are rejected.
#[derive(Clone, Debug, Default)]
pub struct RequestSchema {
    fields: Vec<(String, ValidationRule)>,
}

impl RequestSchema {
    pub fn new() -> Self {
        RequestSchema::default()
    }

    pub fn field(mut self, name: &str, rule: ValidationRule) -> Self {
        self.fields.push((name.to_string(), rule));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValidationRule)> {
        self.fields.iter().map(|(n, r)| (n.as_str(), r))
    }

    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }
}

/// Request types that carry their own schema.
pub trait Validated {
    fn schema() -> RequestSchema;
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate body against the schema. All required fields must be present.
    pub fn validate(body: &Map<String, Value>, schema: &RequestSchema) -> Vec<ValidationIssue> {
        let mut issues = unknown_keys(body, schema);
        for (name, rule) in schema.fields() {
            match body.get(name) {
                None | Some(Value::Null) if rule.required == Some(true) => {
                    issues.push(ValidationIssue::new(name, "is required"));
                }
                Some(v) => validate_field(name, v, rule, &mut issues),
                None => {}
            }
        }
        issues
    }

    /// Validate only the fields present (PATCH). At least one field must be given.
    pub fn validate_partial(body: &Map<String, Value>, schema: &RequestSchema) -> Vec<ValidationIssue> {
        let mut issues = unknown_keys(body, schema);
        if body.is_empty() {
            issues.push(ValidationIssue::root("must contain at least one field"));
        }
        for (name, v) in body {
            if let Some(rule) = schema.rule(name) {
                validate_field(name, v, rule, &mut issues);
            }
        }
        issues
    }
}

fn unknown_keys(body: &Map<String, Value>, schema: &RequestSchema) -> Vec<ValidationIssue> {
    body.keys()
        .filter(|k| schema.rule(k).is_none())
        .map(|k| ValidationIssue::new(k.as_str(), "is not allowed"))
        .collect()
}

fn validate_field(name: &str, v: &Value, rule: &ValidationRule, issues: &mut Vec<ValidationIssue>) {
    if v.is_null() {
        return;
    }
    if let Some(kind) = rule.kind {
        if !kind_matches(kind, v) {
            issues.push(ValidationIssue::new(name, format!("must be {}", kind_phrase(kind))));
            return;
        }
    }
    if let Some(format) = &rule.format {
        if let Some(message) = check_format(v, format) {
            issues.push(ValidationIssue::new(name, message));
        }
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                issues.push(ValidationIssue::new(name, format!("must be at most {} characters", max)));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                issues.push(ValidationIssue::new(name, format!("must be at least {} characters", min)));
            }
        }
        if let Some(pattern) = &rule.pattern {
            match Regex::new(pattern) {
                Ok(re) if !re.is_match(s) => {
                    issues.push(ValidationIssue::new(name, "does not match required pattern"));
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::error!(field = name, error = %e, "invalid validation pattern");
                    issues.push(ValidationIssue::new(name, "cannot be validated"));
                }
            }
        }
    }
    if let Some(allowed) = &rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            issues.push(ValidationIssue::new(
                name,
                format!("must be one of: {:?}", allowed.iter().take(5).collect::<Vec<_>>()),
            ));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                issues.push(ValidationIssue::new(name, format!("must be at least {}", min)));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                issues.push(ValidationIssue::new(name, format!("must be at most {}", max)));
            }
        }
    }
}

fn kind_matches(kind: FieldKind, v: &Value) -> bool {
    match kind {
        FieldKind::String => v.is_string(),
        FieldKind::Integer => v.is_i64() || v.is_u64(),
        FieldKind::Number => v.is_number(),
        FieldKind::Boolean => v.is_boolean(),
    }
}

fn kind_phrase(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::String => "a string",
        FieldKind::Integer => "an integer",
        FieldKind::Number => "a number",
        FieldKind::Boolean => "a boolean",
    }
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn check_format(v: &Value, format: &str) -> Option<&'static str> {
    let s = v.as_str()?;
    match format.to_lowercase().as_str() {
        "email" => {
            let valid = match s.split_once('@') {
                Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
                None => false,
            };
            (!valid).then_some("must be a valid email")
        }
        "uuid" => uuid::Uuid::parse_str(s).is_err().then_some("must be a valid UUID"),
        _ => None,
    }
}

/// Turn string values from a query or path into the JSON kinds the schema expects.
/// Values that do not parse are left as strings for the validator to report.
pub fn coerce_strings<I>(pairs: I, schema: &RequestSchema) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, String)>,
{
    pairs
        .into_iter()
        .map(|(k, raw)| {
            let v = match schema.rule(&k).and_then(|r| r.kind) {
                Some(FieldKind::Integer) => raw.parse::<i64>().map(Value::from).unwrap_or(Value::String(raw)),
                Some(FieldKind::Number) => raw.parse::<f64>().map(Value::from).unwrap_or(Value::String(raw)),
                Some(FieldKind::Boolean) => match raw.as_str() {
                    "true" => Value::Bool(true),
                    "false" => Value::Bool(false),
                    _ => Value::String(raw),
                },
                _ => Value::String(raw),
            };
            (k, v)
        })
        .collect()
}
