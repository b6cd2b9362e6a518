//! CrudService: orchestration over one repository.

use crate::config::{is_base_field, TableDescription, ValidationRule};
use crate::error::AppError;
use crate::repository::{Repository, Row};
use crate::service::{RequestSchema, Validated};
use crate::sql::{Filter, SortDirective};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Window over a result set. Bounds are enforced by request validation, not here.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Validated for Pagination {
    fn schema() -> RequestSchema {
        RequestSchema::new()
            .field("limit", ValidationRule::integer().range(1.0, MAX_LIMIT as f64))
            .field("offset", ValidationRule::integer().minimum(0.0))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Page {
    pub docs: Vec<Row>,
    pub total: i64,
}

#[derive(Clone)]
pub struct CrudService {
    repository: Arc<dyn Repository>,
}

impl CrudService {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        CrudService { repository }
    }

    pub fn table(&self) -> &TableDescription {
        self.repository.table()
    }

    pub async fn count(&self, filter: &Filter) -> Result<i64, AppError> {
        self.repository.count(filter).await
    }

    /// Insert after stripping any base fields from the payload.
    pub async fn create(&self, mut payload: Row) -> Result<Option<Row>, AppError> {
        payload.retain(|k, _| !is_base_field(k));
        self.repository.create(payload).await
    }

    /// List and count concurrently against the same filter. Not a single snapshot:
    /// concurrent writes between the two statements can make `total` drift from `docs`.
    pub async fn find(
        &self,
        pagination: Pagination,
        filter: &Filter,
        sort: &[SortDirective],
    ) -> Result<Page, AppError> {
        let (docs, total) = tokio::try_join!(
            self.repository.find_by(filter, pagination.limit, pagination.offset, sort),
            self.repository.count(filter),
        )?;
        Ok(Page { docs, total })
    }

    /// First row matching `filter` in default order. One statement; no count.
    pub async fn find_one(&self, filter: &Filter) -> Result<Option<Row>, AppError> {
        Ok(self.repository.find_by(filter, 1, 0, &[]).await?.into_iter().next())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.repository.find_by_id(id).await
    }

    /// Partial update. Null values are dropped, so a field cannot be cleared here.
    pub async fn update(&self, payload: Row, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.repository.update_by(drop_nulls(payload), filter).await
    }

    pub async fn update_by_id(&self, id: &str, payload: Row) -> Result<Option<Row>, AppError> {
        self.repository.update_by_id(id, drop_nulls(payload)).await
    }

    pub async fn delete(&self, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.repository.delete_by(filter).await
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.repository.delete_by_id(id).await
    }
}

fn drop_nulls(mut payload: Row) -> Row {
    payload.retain(|_, v| !v.is_null());
    payload
}
