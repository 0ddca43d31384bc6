//! # Database Handle
//!
//! Opens the SQLite file, brings the schema up to date and owns the
//! live-query registry shared by every [`ItemStore`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Opening the Store                               │
//! │                                                                         │
//! │  AppContainer::new                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path) / DbConfig::in_memory()                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       ├── open pool (WAL, file created on demand)                      │
//! │       └── migrate (strict, or rebuild when destructive_fallback)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────────────────┐   ┌──────────────────────────────┐       │
//! │  │  SqlitePool              │   │  Arc<LiveRegistry>           │       │
//! │  │  reads + single writer   │   │  one per Database, shared by │       │
//! │  │                          │   │  every clone                 │       │
//! │  └────────────┬─────────────┘   └──────────────┬───────────────┘       │
//! │               └──────────────┬─────────────────┘                       │
//! │                              ▼                                          │
//! │                     db.items() → ItemStore                             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL journaling lets the live queries re-read while a write is in flight.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::live::LiveRegistry;
use crate::migrations;
use crate::repository::item::ItemStore;

/// Path that selects a private in-memory database.
const IN_MEMORY: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// How to open the item database.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/inventory/inventory.db")
///     .max_connections(4)
///     .destructive_fallback(true);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created when missing. `:memory:` for a throwaway store.
    pub database_path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// How long a store call waits for a free connection. Default: 30 s
    pub acquire_timeout: Duration,

    /// Migrate while opening. Default: true
    pub run_migrations: bool,

    /// Drop every item and rebuild the schema when the applied migrations
    /// don't match the embedded ones. Default: false
    pub destructive_fallback: bool,
}

impl DbConfig {
    /// Settings for the database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            run_migrations: true,
            destructive_fallback: false,
        }
    }

    /// A private store that vanishes with the pool.
    ///
    /// Uses one connection, since each SQLite in-memory connection would
    /// otherwise see its own empty database. The schema is always rebuilt.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            destructive_fallback: true,
            ..DbConfig::new(IN_MEMORY)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Allows a mismatched schema to be dropped and rebuilt.
    pub fn destructive_fallback(mut self, enabled: bool) -> Self {
        self.destructive_fallback = enabled;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        Ok(options.synchronous(SqliteSynchronous::Normal))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Open item database.
///
/// Built once at startup and handed to whoever needs it; there is no global
/// instance. Clones share the pool and the live-query registry, so a write
/// through any clone reaches every open live query.
///
/// ## Usage
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("./inventory.db")).await?;
///
/// let id = db.items().insert(&Item::new("Pen", 2.0, 30)).await?;
/// let mut all = db.items().all_items().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    live: Arc<LiveRegistry>,
}

impl Database {
    /// Opens the store and migrates it according to `config`.
    ///
    /// ## Errors
    /// * `DbError::Connect` - the file can't be opened or created
    /// * `DbError::Migration` - the schema history doesn't match and
    ///   `destructive_fallback` is off
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening item database");

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout);
        if config.is_in_memory() {
            // The data lives only as long as its connection.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::Connect(e.to_string()))?;

        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database {
            pool,
            live: Arc::new(LiveRegistry::default()),
        };

        if config.run_migrations {
            if config.destructive_fallback {
                migrations::run_migrations_or_reset(&db.pool).await?;
            } else {
                db.run_migrations().await?;
            }
        }

        Ok(db)
    }

    /// Applies pending migrations; fails on a mismatched history.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// Raw pool access.
    ///
    /// Writes made directly through the pool are not published to live
    /// queries; use [`Database::items`] instead.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Item store over this database.
    ///
    /// ```rust,ignore
    /// let pen = db.items().get(2).await?;
    /// ```
    pub fn items(&self) -> ItemStore {
        ItemStore::new(self.pool.clone(), Arc::clone(&self.live))
    }

    /// Live queries currently open against this database.
    pub fn live_query_count(&self) -> usize {
        self.live.subscriber_count()
    }

    /// Closes the pool. Later store calls fail with `DbError::Closed`.
    pub async fn close(&self) {
        info!(open_live_queries = self.live_query_count(), "Closing item database");
        self.pool.close().await;
    }

    /// Whether the store still answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::Item;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(migrations::migration_status(db.pool()).await.unwrap(), (1, 1));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/inventory.db")
            .max_connections(8)
            .acquire_timeout(Duration::from_secs(2))
            .destructive_fallback(true);

        assert_eq!(config.max_connections, 8);
        assert_eq!(config.acquire_timeout, Duration::from_secs(2));
        assert!(config.destructive_fallback);
        assert!(!config.is_in_memory());

        assert!(!DbConfig::new("/tmp/inventory.db").destructive_fallback);
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let path = std::env::temp_dir().join(format!("inventory-test-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.items().insert(&Item::new("Pen", 2.0, 30)).await.unwrap();
        db.close().await;
        assert!(path.exists());

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.items().count().await.unwrap(), 1);
        reopened.close().await;

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_mismatched_schema_is_rebuilt_only_with_fallback() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.items().insert(&Item::new("Pen", 2.0, 30)).await.unwrap();

        // Same version, different checksum: another schema history.
        sqlx::query("UPDATE _sqlx_migrations SET checksum = X'00'")
            .execute(db.pool())
            .await
            .unwrap();

        let strict = db.run_migrations().await;
        assert!(matches!(strict, Err(DbError::Migration(_))));

        migrations::run_migrations_or_reset(db.pool()).await.unwrap();
        assert_eq!(db.items().count().await.unwrap(), 0);
        assert_eq!(migrations::migration_status(db.pool()).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_closed_database_reports_closed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        assert!(matches!(db.items().count().await, Err(DbError::Closed)));
    }

    #[tokio::test]
    async fn test_clones_share_live_registry() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let clone = db.clone();

        let query = clone.items().all_items().await.unwrap();
        assert_eq!(db.live_query_count(), 1);

        drop(query);
        assert_eq!(db.live_query_count(), 0);
    }
}
