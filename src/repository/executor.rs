//! Query execution seam: over the pool, or over one open transaction. Rows come back
//! keyed by column name.

use crate::error::AppError;
use crate::repository::Row;
use crate::sql::{PgBindValue, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::Mutex;

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Row>, AppError>;
    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Row>, AppError>;
}

#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        PgExecutor { pool }
    }
}

fn bind(q: &QueryBuf) -> sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments> {
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(PgBindValue::from_json(p));
    }
    query
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind(q).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind(q).fetch_optional(&self.pool).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

/// Executor pinned to one open transaction. Statements run one at a time on its
/// connection; once the transaction is finished every call fails.
pub struct PgTxExecutor {
    tx: Mutex<Option<Transaction<'static, Postgres>>>,
}

impl PgTxExecutor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        PgTxExecutor {
            tx: Mutex::new(Some(tx)),
        }
    }

    /// Take the transaction out so it can be committed or rolled back.
    pub async fn finish(&self) -> Result<Transaction<'static, Postgres>, AppError> {
        self.tx.lock().await.take().ok_or_else(finished)
    }
}

fn finished() -> AppError {
    AppError::Internal("transaction already finished".into())
}

#[async_trait]
impl QueryExecutor for PgTxExecutor {
    async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query in transaction");
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(finished)?;
        let rows = bind(q).fetch_all(&mut **tx).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<Row>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query in transaction");
        let mut guard = self.tx.lock().await;
        let tx = guard.as_mut().ok_or_else(finished)?;
        let row = bind(q).fetch_optional(&mut **tx).await?;
        Ok(row.map(|r| row_to_json(&r)))
    }
}

fn row_to_json(row: &sqlx::postgres::PgRow) -> Row {
    use sqlx::{Column, Row as _};
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), cell_to_value(row, col.name())))
        .collect()
}

/// Full-precision RFC 3339 so a rendered timestamp can be sent back as an equality filter.
fn timestamp_text(d: &chrono::DateTime<chrono::Utc>) -> String {
    d.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true)
}

/// Decode one cell by trying the types the table descriptions use. Columns of any
/// other type are selected as `::text` by the query builder and land in the `String` arm.
fn cell_to_value(row: &sqlx::postgres::PgRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(n)) = row.try_get::<Option<f32>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n as f64) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(timestamp_text(&d));
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDate>, _>(name) {
        return Value::String(d.format("%Y-%m-%d").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
