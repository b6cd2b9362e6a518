//! Per-request access to the service registry attached by the router.

use crate::error::AppError;
use crate::registry::ServiceRegistry;
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

/// The registry attached as a request extension. Handlers look services up through it
/// and never build repositories themselves.
#[derive(Clone)]
pub struct Services(pub Arc<ServiceRegistry>);

impl std::ops::Deref for Services {
    type Target = ServiceRegistry;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Services
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<ServiceRegistry>>()
            .cloned()
            .map(Services)
            .ok_or_else(|| AppError::Internal("service registry not attached to request".into()))
    }
}
