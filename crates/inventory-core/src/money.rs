//! # Money Module
//!
//! Provides the `Money` type used to display prices and purchase totals.
//!
//! ## Storage vs Display
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Item.price is stored as a REAL column (f64)                            │
//! │                                                                         │
//! │  0.1 + 0.2 = 0.30000000000000004   ← fine to store, bad to print       │
//! │                                                                         │
//! │  Money rounds once, to whole cents, and does all further math          │
//! │  (unit price × quantity) in integers:                                  │
//! │                                                                         │
//! │    Money::from_price(2.99).multiply_quantity(3) = 897 cents = $8.97    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use inventory_core::money::Money;
//!
//! let price = Money::from_price(10.99);
//! assert_eq!(price.cents(), 1099);
//! assert_eq!(price.to_string(), "$10.99");
//!
//! let total = price.multiply_quantity(2);
//! assert_eq!(total.to_string(), "$21.98");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Item.price (f64) ──► Money::from_price ──┬──► "$10.99" on the details screen
///                                          │
///                                          └──► × quantity ──► purchase total
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from a decimal price, rounded to the nearest cent.
    ///
    /// Non-finite input (NaN, infinity) becomes zero.
    ///
    /// ## Example
    /// ```rust
    /// use inventory_core::money::Money;
    ///
    /// assert_eq!(Money::from_price(1.005).cents(), 101);
    /// assert_eq!(Money::from_price(-5.5).cents(), -550);
    /// assert_eq!(Money::from_price(f64::NAN).cents(), 0);
    /// ```
    pub fn from_price(price: f64) -> Self {
        if !price.is_finite() {
            return Money::default();
        }
        // Nudge by a tiny epsilon so values like 1.005 (stored as 1.00499..)
        // round the way a human reads them.
        let scaled = price * 100.0;
        let rounded = (scaled + scaled.signum() * 1e-7).round();
        Money(rounded as i64)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Converts back to a decimal price, e.g. 1099 cents → `10.99`.
    #[inline]
    pub fn to_price(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Total for `qty` units at this unit price, saturating on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use inventory_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as a dollar amount without digit grouping, e.g. `$1234.50`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_round_trip_through_price() {
        let money = Money::from_cents(1099);
        assert_eq!(money.to_price(), 10.99);
        assert_eq!(Money::from_price(money.to_price()), money);
    }

    #[test]
    fn test_from_price_rounds_to_cents() {
        assert_eq!(Money::from_price(10.99).cents(), 1099);
        assert_eq!(Money::from_price(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_price(2.0).cents(), 200);
        assert_eq!(Money::from_price(0.0).cents(), 0);
        assert_eq!(Money::from_price(f64::INFINITY).cents(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(123456789).to_string(), "$1234567.89");
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let big = Money::from_cents(i64::MAX / 2);
        assert_eq!(big.multiply_quantity(4).cents(), i64::MAX);
    }
}
