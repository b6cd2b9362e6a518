//! HTTP handlers for auth, tasks and problem docs.

pub mod auth;
pub mod doc;
pub mod tasks;
