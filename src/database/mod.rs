use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use thiserror::Error;

use crate::config::DatabaseConfig;

pub mod content;
pub mod contact;
pub mod portfolio;
pub mod profiles;
pub mod templates;
pub mod tutorials;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Build the connection pool used by every store. Constructed once in main
/// and injected; there is no process-global pool.
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await
}

/// Liveness probe for the health endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn ping(&self) -> Result<(), PersistError>;
}

#[async_trait]
impl HealthProbe for PgPool {
    async fn ping(&self) -> Result<(), PersistError> {
        sqlx::query("SELECT 1").execute(self).await?;
        Ok(())
    }
}
