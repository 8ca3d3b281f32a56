use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Opens the shared connection pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    if config.url.is_empty() {
        return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .max_lifetime(Duration::from_secs(5 * 60))
        .connect(&config.url)
        .await?;

    info!("Connected to PostgreSQL (max_connections={})", config.max_connections);
    Ok(pool)
}

/// Pings the pool to ensure connectivity
pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Maps "no row matched" to `NotFound` for the named resource.
pub(crate) fn found<T>(row: Option<T>, resource: &str) -> Result<T, DatabaseError> {
    row.ok_or_else(|| DatabaseError::NotFound(format!("{} not found", resource)))
}
