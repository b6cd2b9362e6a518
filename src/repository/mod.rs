//! Table-agnostic repository contract and its PostgreSQL implementation.

mod executor;
mod table;
mod transaction;

pub use executor::{PgExecutor, PgTxExecutor, QueryExecutor};
pub use table::TableRepository;
pub use transaction::{PgTransactor, Transactor, UnitOfWork};

use crate::config::TableDescription;
use crate::error::AppError;
use crate::sql::{Filter, SortDirective};
use async_trait::async_trait;
use serde_json::{Map, Value};

/// One entity row, keyed by API field names.
pub type Row = Map<String, Value>;

/// Persistence primitives for a single table. Every call is one statement.
///
/// "Absent" results (`None`, empty `Vec`) mean nothing matched; they are not errors.
#[async_trait]
pub trait Repository: Send + Sync {
    fn table(&self) -> &TableDescription;

    async fn count(&self, filter: &Filter) -> Result<i64, AppError>;

    /// Rows matching `filter`, ordered by `sort` (table default when empty).
    async fn find_by(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
        sort: &[SortDirective],
    ) -> Result<Vec<Row>, AppError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Row>, AppError>;

    /// Insert one row and return it with generated base fields.
    async fn create(&self, data: Row) -> Result<Option<Row>, AppError>;

    async fn update_by(&self, data: Row, filter: &Filter) -> Result<Vec<Row>, AppError>;

    async fn update_by_id(&self, id: &str, data: Row) -> Result<Option<Row>, AppError>;

    /// Returns the deleted rows.
    async fn delete_by(&self, filter: &Filter) -> Result<Vec<Row>, AppError>;

    async fn delete_by_id(&self, id: &str) -> Result<Option<Row>, AppError>;
}
