// Database handle - one SQLite connection pool per configured group
// Pooling, locking and isolation belong to sqlx; this layer only wraps them.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, Transaction};
use std::str::FromStr;
use std::time::Duration;

use crate::config::GroupConfig;
use crate::error::{AppError, AppResult};

/// Transaction wrapper for database operations
///
/// Closures handed a `&mut DatabaseTransaction` can run statements through
/// [`DatabaseTransaction::conn`] but cannot finish the transaction; commit
/// and rollback stay with whoever opened it.
pub struct DatabaseTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl DatabaseTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    /// Connection to execute statements on inside this transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit the transaction
    pub(crate) async fn commit(self) -> AppResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit transaction: {}", e)))
    }

    /// Rollback the transaction
    pub(crate) async fn rollback(self) -> AppResult<()> {
        self.tx
            .rollback()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to rollback transaction: {}", e)))
    }
}

/// Cheaply cloneable handle to a group's connection pool
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &GroupConfig) -> AppResult<Self> {
        if !config.url.starts_with("sqlite:") {
            return Err(AppError::ConfigurationError(format!(
                "Unsupported database url '{}': expected a sqlite: url",
                config.url
            )));
        }

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| {
                AppError::ConfigurationError(format!(
                    "Invalid database url '{}': {}",
                    config.url, e
                ))
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to connect to {}: {}", config.url, e))
            })?;

        tracing::info!(
            url = %config.url,
            max_connections = config.max_connections,
            "database pool connected"
        );
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Health check to verify database connectivity
    pub async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Database health check failed: {}", e)))?;
        Ok(())
    }

    /// Get connection pool statistics as (idle, size)
    pub fn pool_stats(&self) -> (u32, u32) {
        (self.pool.num_idle() as u32, self.pool.size())
    }

    pub async fn begin_transaction(&self) -> AppResult<DatabaseTransaction> {
        let tx =
            self.pool.begin().await.map_err(|e| {
                AppError::DatabaseError(format!("Failed to begin transaction: {}", e))
            })?;
        Ok(DatabaseTransaction::new(tx))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn temp_database(dir: &tempfile::TempDir) -> Database {
        let url = format!("sqlite://{}", dir.path().join("handle.db").display());
        Database::connect(&GroupConfig::new(url)).await.unwrap()
    }

    #[tokio::test]
    async fn test_connect_and_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_database(&dir).await;

        db.health_check().await.unwrap();
        let (_, size) = db.pool_stats();
        assert!(size >= 1);
    }

    #[tokio::test]
    async fn test_invalid_url_is_configuration_error() {
        let err = Database::connect(&GroupConfig::new("postgres://nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let dir = tempfile::tempdir().unwrap();
        let db = temp_database(&dir).await;
        sqlx::query("CREATE TABLE t (v INTEGER)")
            .execute(db.pool())
            .await
            .unwrap();

        let mut tx = db.begin_transaction().await.unwrap();
        sqlx::query("INSERT INTO t (v) VALUES (1)")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut tx = db.begin_transaction().await.unwrap();
        sqlx::query("INSERT INTO t (v) VALUES (2)")
            .execute(tx.conn())
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let values: Vec<i64> = sqlx::query_scalar("SELECT v FROM t")
            .fetch_all(db.pool())
            .await
            .unwrap();
        assert_eq!(values, vec![2]);
    }
}
