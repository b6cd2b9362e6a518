//! CrudService over a Repository, plus request validation.

mod crud;
mod validation;
pub use crud::{CrudService, Page, Pagination, DEFAULT_LIMIT, MAX_LIMIT};
pub use validation::{coerce_strings, RequestSchema, RequestValidator, Validated};
