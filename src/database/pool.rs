use crate::config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

const DEFAULT_MIGRATIONS: &str = "./migrations";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to the user database: {0}")]
    PoolCreation(sqlx::Error),

    #[error("Timed out waiting for a database connection")]
    ConnectionTimeout,

    #[error("Database migration failed: {0}")]
    Migration(#[from] MigrateError),
}

impl DatabaseError {
    fn connect(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
            other => DatabaseError::PoolCreation(other),
        }
    }
}

/// Open the pool and make sure a connection actually works before handing
/// it to the credential store.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect(&config.url)
        .await
        .map_err(DatabaseError::connect)?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(DatabaseError::connect)?;

    Ok(pool)
}

/// Apply the `users` / `user_credentials` schema. `None` uses `./migrations`.
pub async fn run_migrations(
    pool: &PgPool,
    migrations_path: Option<&str>,
) -> Result<(), DatabaseError> {
    let path = migrations_path.unwrap_or(DEFAULT_MIGRATIONS);
    debug!("Running migrations from {}", path);

    let migrator = Migrator::new(Path::new(path)).await?;
    migrator.run(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_maps_to_connection_timeout() {
        let err = DatabaseError::connect(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DatabaseError::ConnectionTimeout));

        let err = DatabaseError::connect(sqlx::Error::PoolClosed);
        assert!(matches!(err, DatabaseError::PoolCreation(_)));
    }
}
