//! # Error Types
//!
//! Input errors raised by inventory-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  inventory-core errors (this file)                                     │
//! │  └── ValidationError  - Rejected input (strict parsing, purchases)     │
//! │                                                                         │
//! │  inventory-db errors (separate crate)                                  │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  inventory-ui errors                                                   │
//! │  └── UiError          - What a view-model action reports               │
//! │                                                                         │
//! │  Flow: ValidationError → UiError ← DbError                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blank fields in a draft never become errors: they only disable Save.
//! `ValidationError` is produced by the strict parsing path and by
//! purchase-quantity checks.

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Stored numbers may be zero but not below.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Text could not be parsed into the expected type.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a `Required` error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    pub fn negative(field: impl Into<String>) -> Self {
        ValidationError::Negative {
            field: field.into(),
        }
    }

    /// Creates an `InvalidFormat` error for a field.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("name").to_string(), "name is required");

        let err = ValidationError::invalid_format("price", "not a number");
        assert_eq!(err.to_string(), "price has invalid format: not a number");

        let err = ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        };
        assert_eq!(err.to_string(), "name must be at most 200 characters");

        assert_eq!(ValidationError::negative("price").to_string(), "price must not be negative");
    }
}
