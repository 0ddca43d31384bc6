//! # Application Error Type
//!
//! Unified error type for startup and commands.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  inventory sell 7                                                      │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command                                                         │  │
//! │  │  AppResult<()>                                                   │  │
//! │  │         │                                                        │  │
//! │  │  Storage failure? ─── UiError::Db(DbError) ──────┐              │  │
//! │  │  Bad input?       ─── ValidationError ───────────┼──► AppError  │  │
//! │  │  No such item?    ─── AppError::ItemNotFound ────┘       │       │  │
//! │  └──────────────────────────────────────────────────────────┼───────┘  │
//! │                                                             ▼          │
//! │                     ErrorReport { code, message } ──► stderr, exit 1   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use inventory_core::ValidationError;
use inventory_db::DbError;
use inventory_ui::UiError;
use serde::Serialize;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing, unreadable or inconsistent.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file is not valid TOML.
    #[error("Could not parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Filesystem error (config file, data directory).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage failure during startup.
    #[error(transparent)]
    Db(#[from] DbError),

    /// A view-model action failed.
    #[error(transparent)]
    Ui(#[from] UiError),

    /// Command-line input was rejected.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// No item with this id.
    #[error("Item not found: {0}")]
    ItemNotFound(i64),

    /// Output could not be encoded.
    #[error("Could not encode output: {0}")]
    Output(#[from] serde_json::Error),

    /// A screen state ended unexpectedly.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Machine-readable error category for `--json` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    ValidationError,
    DatabaseError,
    ConfigError,
    Internal,
}

/// What `--json` callers receive when a command fails.
///
/// ```json
/// { "code": "NOT_FOUND", "message": "Item not found: 7" }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

impl AppError {
    /// Category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Config(_) | AppError::ConfigParse(_) => ErrorCode::ConfigError,
            AppError::Db(_) | AppError::Ui(UiError::Db(_)) => ErrorCode::DatabaseError,
            AppError::Validation(_)
            | AppError::Ui(UiError::Validation(_))
            | AppError::Ui(UiError::ItemExists(_)) => ErrorCode::ValidationError,
            AppError::ItemNotFound(_) => ErrorCode::NotFound,
            AppError::Io(_)
            | AppError::Output(_)
            | AppError::Internal(_)
            | AppError::Ui(UiError::TaskFailed(_)) => ErrorCode::Internal,
        }
    }

    /// Serializable form of this error.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AppError::ItemNotFound(7).code(), ErrorCode::NotFound);
        assert_eq!(
            AppError::from(UiError::from(DbError::PoolExhausted)).code(),
            ErrorCode::DatabaseError
        );
        assert_eq!(
            AppError::from(ValidationError::required("price")).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(
            AppError::from(UiError::ItemExists(2)).code(),
            ErrorCode::ValidationError
        );
        assert_eq!(AppError::Config("x".into()).code(), ErrorCode::ConfigError);
    }

    #[test]
    fn test_report_serialization() {
        let json = serde_json::to_value(AppError::ItemNotFound(7).report()).unwrap();
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Item not found: 7");
    }
}
