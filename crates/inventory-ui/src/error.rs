//! # UI Error Types
//!
//! Errors surfaced by view-model actions.
//!
//! A blank draft field is not an error: Save is simply unavailable and
//! `save_item` reports `Ok(None)` / `Ok(false)`. The variants here are the
//! failures a front-end may want to show.

use inventory_core::ValidationError;
use inventory_db::DbError;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors returned from view-model actions.
#[derive(Debug, Error)]
pub enum UiError {
    /// The store rejected or failed the write.
    #[error("Storage error: {0}")]
    Db(#[from] DbError),

    /// The draft carries the id of an item that is already stored.
    #[error("Item {0} already exists")]
    ItemExists(i64),

    /// Input was rejected before reaching the store.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// A spawned write task panicked or was aborted.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<JoinError> for UiError {
    fn from(err: JoinError) -> Self {
        UiError::TaskFailed(err.to_string())
    }
}

/// Result type for view-model actions.
pub type UiResult<T> = Result<T, UiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = UiError::from(DbError::PoolExhausted);
        assert_eq!(err.to_string(), "Storage error: Timed out waiting for a database connection");

        let err = UiError::from(ValidationError::required("name"));
        assert!(matches!(err, UiError::Validation(_)));
    }
}
