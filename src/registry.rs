//! One CrudService per table, built once at startup and shared read-only afterwards.

use crate::config::{validate, TableDescription};
use crate::error::{AppError, ConfigError};
use crate::repository::{PgExecutor, PgTransactor, Repository, TableRepository, Transactor, UnitOfWork};
use crate::service::CrudService;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ServiceRegistry {
    services: HashMap<String, CrudService>,
    transactor: Option<Arc<dyn Transactor>>,
}

impl ServiceRegistry {
    /// Validate the tables and build a service for each through `repository_for`.
    pub fn build<F>(tables: Vec<TableDescription>, mut repository_for: F) -> Result<Self, ConfigError>
    where
        F: FnMut(TableDescription) -> Arc<dyn Repository>,
    {
        validate(&tables)?;
        let mut services = HashMap::with_capacity(tables.len());
        for table in tables {
            let name = table.table_name.clone();
            if services.contains_key(&name) {
                return Err(ConfigError::DuplicateTable(name));
            }
            services.insert(name, CrudService::new(repository_for(table)));
        }
        tracing::info!(tables = ?services.keys().collect::<Vec<_>>(), "service registry built");
        Ok(ServiceRegistry {
            services,
            transactor: None,
        })
    }

    /// PostgreSQL-backed registry sharing one pool.
    pub fn postgres(tables: Vec<TableDescription>, pool: PgPool) -> Result<Self, ConfigError> {
        let executor = Arc::new(PgExecutor::new(pool.clone()));
        let registry = Self::build(tables, |table| {
            Arc::new(TableRepository::new(table, executor.clone())) as Arc<dyn Repository>
        })?;
        Ok(registry.with_transactions(Arc::new(PgTransactor::new(pool))))
    }

    /// Enable [`ServiceRegistry::transaction`] through `transactor`.
    pub fn with_transactions(mut self, transactor: Arc<dyn Transactor>) -> Self {
        self.transactor = Some(transactor);
        self
    }

    /// Open a transaction and bind a service for every table to it.
    pub async fn transaction(&self) -> Result<TxServices, AppError> {
        let transactor = self
            .transactor
            .as_ref()
            .ok_or_else(|| AppError::Internal("transactions are not configured".into()))?;
        let work = transactor.begin().await?;
        let services = self
            .services
            .iter()
            .map(|(name, service)| (name.clone(), CrudService::new(work.repository(service.table().clone()))))
            .collect();
        Ok(TxServices { work, services })
    }

    pub fn get(&self, table: &str) -> Option<&CrudService> {
        self.services.get(table)
    }

    pub fn service(&self, table: &str) -> Result<&CrudService, AppError> {
        self.get(table)
            .ok_or_else(|| ConfigError::UnknownTable(table.to_string()).into())
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Services whose writes land together on [`TxServices::commit`]. Dropped without a
/// commit, nothing they wrote is kept.
pub struct TxServices {
    work: Box<dyn UnitOfWork>,
    services: HashMap<String, CrudService>,
}

impl TxServices {
    pub fn service(&self, table: &str) -> Result<&CrudService, AppError> {
        self.services
            .get(table)
            .ok_or_else(|| ConfigError::UnknownTable(table.to_string()).into())
    }

    pub async fn commit(self) -> Result<(), AppError> {
        self.work.commit().await
    }

    pub async fn rollback(self) -> Result<(), AppError> {
        self.work.rollback().await
    }
}
