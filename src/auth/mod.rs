//! Cookie-carried JWT sessions and password hashing.

pub mod cookie;
pub mod jwt;
mod middleware;
pub mod password;

pub use jwt::Claims;
pub use middleware::require_auth;
