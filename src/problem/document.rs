//! The problem document returned to clients.

use super::code::ProblemCode;
use super::source::{FieldError, ValidationIssue, ValidationTarget};
use serde::Serialize;

/// Canonical error payload. Built fresh per failed request; `status` and `title` always
/// follow from `code`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    code: ProblemCode,
    status: u16,
    title: &'static str,
    detail: String,
    instance: String,
    request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl Problem {
    /// Plain problem. `message` overrides the fixed detail text for `code`.
    pub fn new(
        code: ProblemCode,
        instance: impl Into<String>,
        request_id: impl Into<String>,
        message: Option<&str>,
    ) -> Self {
        Problem {
            code,
            status: code.status().as_u16(),
            title: code.title(),
            detail: message.map(str::to_string).unwrap_or_else(|| code.detail().to_string()),
            instance: instance.into(),
            request_id: request_id.into(),
            errors: None,
        }
    }

    /// Problem carrying one field error per schema violation. With no issues the
    /// `errors` member is omitted rather than sent empty.
    pub fn validation(
        code: ProblemCode,
        instance: impl Into<String>,
        request_id: impl Into<String>,
        target: ValidationTarget,
        issues: &[ValidationIssue],
    ) -> Self {
        let mut problem = Problem::new(code, instance, request_id, None);
        if !issues.is_empty() {
            problem.errors = Some(issues.iter().map(|i| FieldError::from_issue(target, i)).collect());
        }
        problem
    }

    pub fn code(&self) -> ProblemCode {
        self.code
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn title(&self) -> &str {
        self.title
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn instance(&self) -> &str {
        &self.instance
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn errors(&self) -> Option<&[FieldError]> {
        self.errors.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_problem_uses_fixed_tables() {
        let p = Problem::new(ProblemCode::NotFound, "/tasks/1", "req-1", None);
        assert_eq!(
            serde_json::to_value(&p).unwrap(),
            json!({
                "code": "NOT_FOUND",
                "status": 404,
                "title": "Not Found",
                "detail": "The requested resource was not found.",
                "instance": "/tasks/1",
                "requestId": "req-1"
            })
        );
    }

    #[test]
    fn message_overrides_detail_only() {
        let p = Problem::new(ProblemCode::Unauthorized, "/login", "r", Some("Login or password is incorrect"));
        assert_eq!(p.detail(), "Login or password is incorrect");
        assert_eq!(p.title(), "Unauthorized");
        assert_eq!(p.status(), 401);
    }

    #[test]
    fn validation_problem_lists_errors() {
        let issues = vec![ValidationIssue::new("name", "Required")];
        let p = Problem::validation(ProblemCode::UnprocessableEntity, "/tasks", "r", ValidationTarget::Json, &issues);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["errors"][0]["source"]["pointer"], "/body/name");
        assert_eq!(v["status"], 422);
    }

    #[test]
    fn validation_problem_without_issues_omits_errors() {
        let p = Problem::validation(ProblemCode::UnprocessableEntity, "/", "r", ValidationTarget::Query, &[]);
        assert!(p.errors().is_none());
        assert!(serde_json::to_value(&p).unwrap().get("errors").is_none());
    }
}
