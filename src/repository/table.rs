use crate::config::TableDescription;
use crate::error::AppError;
use crate::repository::{QueryExecutor, Repository, Row};
use crate::sql::{self, Filter, SortDirective};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Repository over one resolved table, executing through an injected executor.
pub struct TableRepository {
    table: TableDescription,
    executor: Arc<dyn QueryExecutor>,
}

impl TableRepository {
    pub fn new(table: TableDescription, executor: Arc<dyn QueryExecutor>) -> Self {
        TableRepository { table, executor }
    }

    fn to_fields(&self, row: Row) -> Row {
        self.table.row_from_columns(row)
    }
}

#[async_trait]
impl Repository for TableRepository {
    fn table(&self) -> &TableDescription {
        &self.table
    }

    async fn count(&self, filter: &Filter) -> Result<i64, AppError> {
        let q = sql::count(&self.table, filter)?;
        let row = self.executor.fetch_optional(&q).await?;
        let total = row
            .as_ref()
            .and_then(|r| r.get("total"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(total)
    }

    async fn find_by(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
        sort: &[SortDirective],
    ) -> Result<Vec<Row>, AppError> {
        let order_by = sql::translate(sort, &self.table)?;
        let q = sql::select_list(&self.table, filter, &order_by, Some(limit), Some(offset))?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_fields(r)).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        let q = sql::select_by_id(&self.table, id)?;
        Ok(self.executor.fetch_optional(&q).await?.map(|r| self.to_fields(r)))
    }

    async fn create(&self, data: Row) -> Result<Option<Row>, AppError> {
        let q = sql::insert(&self.table, &data)?;
        Ok(self.executor.fetch_optional(&q).await?.map(|r| self.to_fields(r)))
    }

    async fn update_by(&self, data: Row, filter: &Filter) -> Result<Vec<Row>, AppError> {
        let q = sql::update_where(&self.table, &data, filter)?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_fields(r)).collect())
    }

    async fn update_by_id(&self, id: &str, data: Row) -> Result<Option<Row>, AppError> {
        let q = sql::update_by_id(&self.table, id, &data)?;
        Ok(self.executor.fetch_optional(&q).await?.map(|r| self.to_fields(r)))
    }

    async fn delete_by(&self, filter: &Filter) -> Result<Vec<Row>, AppError> {
        let q = sql::delete_where(&self.table, filter)?;
        let rows = self.executor.fetch_all(&q).await?;
        Ok(rows.into_iter().map(|r| self.to_fields(r)).collect())
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        let q = sql::delete_by_id(&self.table, id)?;
        Ok(self.executor.fetch_optional(&q).await?.map(|r| self.to_fields(r)))
    }
}
