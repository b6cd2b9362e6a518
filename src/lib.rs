//! taskhub: task tracking REST backend over a table-generic PostgreSQL persistence layer,
//! with problem+json error responses.

pub mod auth;
pub mod case;
pub mod config;
pub mod entities;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod migration;
pub mod problem;
pub mod registry;
pub mod repository;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::{resolve, AuthSettings, Settings, TableDescription};
pub use error::{AppError, ConfigError};
pub use migration::apply_migrations;
pub use registry::ServiceRegistry;
pub use repository::{Repository, Row};
pub use routes::build_app;
pub use service::{CrudService, Page, Pagination};
pub use state::AppState;
pub use store::{connect, ensure_database_exists};
