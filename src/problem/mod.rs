//! Problem pipeline: classify a failure, log it once, render `application/problem+json`.

mod code;
mod context;
mod document;
mod failure;
mod response;
mod schema;
mod source;
mod triage;

pub use code::ProblemCode;
pub use context::{RequestContext, REQUEST_ID_HEADER};
pub use document::Problem;
pub use failure::Failure;
pub use response::{panic_to_problem, render_problems, respond, ProblemResponse, PROBLEM_CONTENT_TYPE};
pub use schema::{catalog, problem_doc, validation_problem_doc, ProblemDoc};
pub use source::{ErrorSource, FieldError, ParamLocation, ValidationIssue, ValidationTarget};
pub use triage::{classify_sqlstate, classify_status};
