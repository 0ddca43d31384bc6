//! # Validation Module
//!
//! Input validation utilities for item drafts and purchases.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Draft blank check (ItemDetails::is_valid)                    │
//! │  ├── name, price and quantity must be non-blank                        │
//! │  └── Drives the Save button; never surfaces as an error                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Conversion (ItemDetails::to_item)                            │
//! │  ├── Malformed numbers silently become 0 / 0.0                         │
//! │  └── THIS MODULE offers strict parsing for callers that want errors    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── PRIMARY KEY uniqueness                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use inventory_core::validation::{parse_price_text, validate_purchase_quantity};
//!
//! assert_eq!(parse_price_text("2.50").unwrap(), 2.5);
//! assert!(parse_price_text("abc").is_err());
//! assert!(validate_purchase_quantity(0).is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Returns true when the text is empty or whitespace only.
#[inline]
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

/// Validates an item name.
///
/// ## Rules
/// - Must not be blank
/// - At most 200 characters after trimming
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required("name"));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price.
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative (zero is allowed for free items)
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::invalid_format("price", "must be a finite number"));
    }

    if price < 0.0 {
        return Err(ValidationError::negative("price"));
    }

    Ok(())
}

/// Validates a stock quantity.
///
/// ## Rules
/// - Must be non-negative (zero means out of stock)
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::negative("quantity"));
    }

    Ok(())
}

/// Validates the number of units in a purchase.
///
/// ## Rules
/// - Must be positive (> 0)
/// - May exceed the stock on hand: the stock is floored at zero instead
pub fn validate_purchase_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "purchase quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Strict Parsing
// =============================================================================

/// Parses price text strictly.
///
/// Unlike the draft conversion, blank or malformed text is an error.
pub fn parse_price_text(text: &str) -> ValidationResult<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::required("price"));
    }

    let price = text
        .parse::<f64>()
        .map_err(|_| ValidationError::invalid_format("price", format!("'{}' is not a number", text)))?;

    validate_price(price)?;
    Ok(price)
}

/// Parses quantity text strictly.
pub fn parse_quantity_text(text: &str) -> ValidationResult<i64> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::required("quantity"));
    }

    let quantity = text.parse::<i64>().map_err(|_| {
        ValidationError::invalid_format("quantity", format!("'{}' is not a whole number", text))
    })?;

    validate_quantity(quantity)?;
    Ok(quantity)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("   \t"));
        assert!(!is_blank(" a "));
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Pen").is_ok());
        assert_eq!(validate_item_name("  "), Err(ValidationError::required("name")));
        assert!(validate_item_name(&"A".repeat(201)).is_err());
        assert!(validate_item_name(&"A".repeat(200)).is_ok());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(10.99).is_ok());
        assert!(validate_price(-0.01).is_err());
        assert!(validate_price(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(50).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_purchase_quantity() {
        assert!(validate_purchase_quantity(1).is_ok());
        assert!(validate_purchase_quantity(0).is_err());
        assert!(validate_purchase_quantity(-3).is_err());
    }

    #[test]
    fn test_parse_price_text() {
        assert_eq!(parse_price_text(" 2.5 "), Ok(2.5));
        assert_eq!(parse_price_text(""), Err(ValidationError::required("price")));
        assert!(matches!(
            parse_price_text("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(parse_price_text("-1").is_err());
    }

    #[test]
    fn test_parse_quantity_text() {
        assert_eq!(parse_quantity_text("12"), Ok(12));
        assert!(matches!(
            parse_quantity_text("1.5"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert_eq!(parse_quantity_text(" "), Err(ValidationError::required("quantity")));
    }
}
