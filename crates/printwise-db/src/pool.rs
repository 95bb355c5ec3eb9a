//! # Database Handle
//!
//! Opens the SQLite pool the quoting workflow runs on and hands out
//! repositories and transactions.
//!
//! ## Transaction Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  QuoteService operation                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.begin()            one pooled connection, BEGIN                     │
//! │       │                                                                 │
//! │       ├── read quote / catalog rows                                     │
//! │       ├── write   (first write takes SQLite's single write lock)        │
//! │       │            a second writer waits up to busy_timeout             │
//! │       ▼                                                                 │
//! │  tx.commit()           or drop ──► ROLLBACK, nothing persisted          │
//! │                                                                         │
//! │  Two clients approving the same quote: both wait their turn on the      │
//! │  write lock, the status compare-and-set lets exactly one through.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An in-memory database lives on one connection and dies with it. Callers
//! holding a connection must not ask the pool for another one.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::quote::QuoteRepository;
use crate::repository::waste::WasteRepository;

const IN_MEMORY: &str = ":memory:";

/// Where the database lives and how many connections may use it.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Default 5: one shop's staff plus share-link traffic.
    pub max_connections: u32,

    /// How long a write waits for another transaction's lock. Default 5s.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// File-backed database, created on first connect.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private, throwaway database on a single connection (tests, demos).
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            busy_timeout: Duration::from_secs(5),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(IN_MEMORY)
    }
}

/// Shared handle on the pool. Clones share the same connections.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects and brings the schema up to date.
    ///
    /// Every connection gets WAL journaling, `synchronous = NORMAL`,
    /// enforced foreign keys and the configured busy timeout.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening database"
        );

        let location = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
        };
        let options = location
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // The schema is gone as soon as the last connection closes
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run(&pool).await?;

        Ok(Database { pool })
    }

    /// Starts the transaction a service operation runs in.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin().await?)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn quotes(&self) -> QuoteRepository {
        QuoteRepository::new(self.pool.clone())
    }

    /// Clients, products and finishings.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    pub fn waste(&self) -> WasteRepository {
        WasteRepository::new(self.pool.clone())
    }

    pub async fn close(&self) {
        info!("Closing database");
        self.pool.close().await;
    }

    /// `true` when a trivial query succeeds. Backs `GET /health`.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printwise_core::{Client, ClientId};

    #[tokio::test]
    async fn test_in_memory_schema_is_ready() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(applied as usize, migrations::MIGRATOR.migrations.len());

        let quotes: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(quotes, 0);
    }

    #[tokio::test]
    async fn test_connection_pragmas() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let foreign_keys: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(foreign_keys, 1);

        let busy_timeout: i64 = sqlx::query_scalar("PRAGMA busy_timeout")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(busy_timeout, 5000);
    }

    #[tokio::test]
    async fn test_dropped_transaction_persists_nothing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        {
            let mut tx = db.begin().await.unwrap();
            sqlx::query("INSERT INTO clients (id, name) VALUES (1, 'Imprenta Norte')")
                .execute(&mut *tx)
                .await
                .unwrap();
            assert!(CatalogRepository::client_exists(&mut tx, ClientId(1)).await.unwrap());
        }

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(!CatalogRepository::client_exists(&mut conn, ClientId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_committed_transaction_is_visible() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        sqlx::query("INSERT INTO clients (id, name) VALUES (2, 'Copistería Luz')")
            .execute(&mut *tx)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        db.catalog()
            .upsert_client(&Client {
                id: ClientId(3),
                name: "Rótulos Mar".to_string(),
                email: None,
            })
            .await
            .unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        assert!(CatalogRepository::client_exists(&mut conn, ClientId(2)).await.unwrap());
        assert!(CatalogRepository::client_exists(&mut conn, ClientId(3)).await.unwrap());
    }

    #[test]
    fn test_config() {
        let file = DbConfig::new("/var/lib/printwise/printwise.db").max_connections(8);
        assert_eq!(file.max_connections, 8);
        assert!(!file.is_in_memory());

        let memory = DbConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert!(memory.is_in_memory());
    }
}
