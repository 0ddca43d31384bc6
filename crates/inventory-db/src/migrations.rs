//! # Database Migrations
//!
//! Embedded SQL migrations for the inventory database.
//!
//! ## How Migrations Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Migration Process                                  │
//! │                                                                         │
//! │  App Startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Compare embedded migrations vs _sqlx_migrations                       │
//! │       │                                                                 │
//! │       ├── all applied / pending ──► run pending, continue startup      │
//! │       │                                                                 │
//! │       └── ledger doesn't match (missing / modified / dirty)            │
//! │                │                                                        │
//! │                ├── destructive fallback OFF ──► DbError::Migration       │
//! │                │                                                        │
//! │                └── destructive fallback ON                             │
//! │                      DROP items, DROP _sqlx_migrations                 │
//! │                      run all migrations from scratch                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_category.sql`)
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::migrate::MigrateError;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Transactional: each migration runs in a transaction
/// - Ordered: migrations run in filename order (001, 002, ...)
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Runs migrations, rebuilding the schema from scratch when the applied
/// history doesn't match the embedded migrations.
///
/// All stored items are lost when the rebuild happens.
pub async fn run_migrations_or_reset(pool: &SqlitePool) -> DbResult<()> {
    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("All migrations applied successfully");
            Ok(())
        }
        Err(err) if is_schema_mismatch(&err) => {
            warn!(error = %err, "Schema mismatch - dropping all data and rebuilding");
            reset_schema(pool).await?;
            MIGRATOR.run(pool).await?;
            info!("Schema rebuilt from scratch");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Returns true for errors that mean "the database was migrated by a
/// different schema history".
fn is_schema_mismatch(err: &MigrateError) -> bool {
    matches!(
        err,
        MigrateError::VersionMissing(_) | MigrateError::VersionMismatch(_) | MigrateError::Dirty(_)
    )
}

/// Drops every table owned by the embedded migrations, plus the ledger.
async fn reset_schema(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query("DROP TABLE IF EXISTS items").execute(pool).await?;
    sqlx::query("DROP TABLE IF EXISTS _sqlx_migrations")
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns information about migrations.
///
/// ## Returns
/// Tuple of (total_migrations, applied_migrations)
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let ledger: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if ledger == 0 {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};

    #[tokio::test]
    async fn test_status_before_and_after_migrating() {
        let db = Database::new(DbConfig::in_memory().run_migrations(false))
            .await
            .unwrap();
        assert_eq!(migration_status(db.pool()).await.unwrap(), (1, 0));

        run_migrations(db.pool()).await.unwrap();
        assert_eq!(migration_status(db.pool()).await.unwrap(), (1, 1));
    }

    #[tokio::test]
    async fn test_status_reports_closed_pool() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let status = migration_status(db.pool()).await;
        assert!(matches!(status, Err(DbError::Closed)));
    }
}
