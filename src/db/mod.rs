//! PostgreSQL persistence for brackets.
//!
//! `Database` owns the pool and hands out the two ways bracket code
//! reaches it: a `BracketManager` for whole operations, or a
//! transaction-bound `PgMatchStore` for callers composing their own.

use sqlx::{
    PgPool, Row,
    postgres::{PgConnectOptions, PgPoolOptions},
};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod repository;
pub mod timeouts;

pub use config::DatabaseConfig;
pub use repository::PgMatchStore;

use crate::bracket::{BracketManager, BracketResult};
use timeouts::with_timeout;

/// Connected bracket database
#[derive(Clone)]
pub struct Database {
    pool: Arc<PgPool>,
    query_timeout: Duration,
}

impl Database {
    /// Open a pool sized and timed by `config`
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bracketry::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let db = Database::connect(&DatabaseConfig::from_env()).await?;
    ///     let matches = db.manager().generate_bracket(1, &[4, 8, 15, 16]).await?;
    ///     println!("created {} matches", matches.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> BracketResult<Self> {
        let options = PgConnectOptions::from_str(&config.database_url)?
            .application_name("bracketry");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect_with(options)
            .await?;

        log::debug!(
            "Opened bracket pool ({}..{} connections)",
            config.min_connections,
            config.max_connections
        );

        Ok(Self {
            pool: Arc::new(pool),
            query_timeout: config.query_timeout(),
        })
    }

    /// Shared pool handle
    pub fn pool(&self) -> Arc<PgPool> {
        self.pool.clone()
    }

    /// Manager running each bracket operation in its own transaction
    pub fn manager(&self) -> BracketManager {
        BracketManager::new(self.pool.clone()).with_query_timeout(self.query_timeout)
    }

    /// Begin a transaction-bound match store
    pub async fn begin(&self) -> BracketResult<PgMatchStore> {
        PgMatchStore::begin_with_timeout(self.pool.as_ref(), self.query_timeout).await
    }

    /// Whether the `tournaments` and `matches` tables are present
    pub async fn schema_ready(&self) -> BracketResult<bool> {
        let row = with_timeout(
            self.query_timeout,
            sqlx::query(
                "SELECT to_regclass('tournaments') IS NOT NULL \
                 AND to_regclass('matches') IS NOT NULL AS ready",
            )
            .fetch_one(self.pool.as_ref()),
        )
        .await?;

        Ok(row.get("ready"))
    }

    /// Close the pool, waiting for open transactions to finish
    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::BracketError;

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let config = DatabaseConfig {
            database_url: "not a database url".to_string(),
            ..DatabaseConfig::default()
        };

        let result = Database::connect(&config).await;
        assert!(matches!(result, Err(BracketError::Persistence(_))));
    }
}
