//! # Storage Errors
//!
//! Failures of the item store. A missing item is never one of them: lookups
//! and live queries report absence as `None`.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Where DbError Goes                                   │
//! │                                                                         │
//! │  sqlx::Error / MigrateError                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← one variant per kind of storage failure       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UiError::Db (inventory-ui) ← resolved by a view-model write task      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError → DATABASE_ERROR report; never retried on the way up         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Storage failure.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file couldn't be opened or created.
    ///
    /// ## Typical Causes
    /// - Parent directory missing or read-only
    /// - Malformed path in the configuration
    #[error("Could not open database: {0}")]
    Connect(String),

    /// The schema couldn't be brought up to date.
    ///
    /// Also returned when the applied history doesn't match the embedded
    /// migrations and the destructive fallback is off.
    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// A row broke a table constraint (e.g. `NOT NULL`).
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// SQLite rejected or failed a statement.
    #[error("Query failed: {0}")]
    Query(String),

    /// No connection became free within the acquire timeout.
    #[error("Timed out waiting for a database connection")]
    PoolExhausted,

    /// The pool was closed by `Database::close`.
    #[error("Database is closed")]
    Closed,

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Maps sqlx failures onto [`DbError`].
///
/// ```text
/// sqlx::Error::Database       → Constraint ("... constraint failed") or Query
/// sqlx::Error::PoolTimedOut   → PoolExhausted
/// sqlx::Error::PoolClosed     → Closed
/// sqlx::Error::Io / Configuration → Connect
/// anything else               → Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if msg.contains("constraint failed") {
                    DbError::Constraint(msg.to_string())
                } else {
                    DbError::Query(msg.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::Closed,
            sqlx::Error::Io(e) => DbError::Connect(e.to_string()),
            sqlx::Error::Configuration(e) => DbError::Connect(e.to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

/// Result alias for store operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors() {
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolExhausted));
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::Closed));
        assert_eq!(DbError::Closed.to_string(), "Database is closed");
    }

    #[test]
    fn test_unmapped_errors_are_internal() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::Internal(_)));
    }

    #[tokio::test]
    async fn test_constraint_failure_is_classified() {
        use crate::{Database, DbConfig};

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = sqlx::query("INSERT INTO items (name, price, quantity) VALUES (NULL, 1.0, 1)")
            .execute(db.pool())
            .await
            .unwrap_err();

        match DbError::from(err) {
            DbError::Constraint(msg) => assert!(msg.contains("items.name")),
            other => panic!("expected a constraint error, got {:?}", other),
        }
    }
}
