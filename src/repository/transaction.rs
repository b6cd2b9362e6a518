//! Units of work: repositories that share one transaction and commit together.

use crate::config::TableDescription;
use crate::error::AppError;
use crate::repository::{executor::PgTxExecutor, Repository, TableRepository};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

/// Opens units of work against one store.
#[async_trait]
pub trait Transactor: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

/// One open transaction. Dropping it without [`UnitOfWork::commit`] rolls it back.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Repository for `table` whose statements run inside this transaction.
    fn repository(&self, table: TableDescription) -> Arc<dyn Repository>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;

    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct PgTransactor {
    pool: PgPool,
}

impl PgTransactor {
    pub fn new(pool: PgPool) -> Self {
        PgTransactor { pool }
    }
}

#[async_trait]
impl Transactor for PgTransactor {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork {
            executor: Arc::new(PgTxExecutor::new(tx)),
        }))
    }
}

struct PgUnitOfWork {
    executor: Arc<PgTxExecutor>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn repository(&self, table: TableDescription) -> Arc<dyn Repository> {
        Arc::new(TableRepository::new(table, self.executor.clone()))
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.executor.finish().await?.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.executor.finish().await?.rollback().await?;
        Ok(())
    }
}
