//! # Domain Types
//!
//! Core domain types used throughout the inventory app.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   to_item_details   ┌─────────────────┐           │
//! │  │      Item       │ ──────────────────► │   ItemDetails   │           │
//! │  │  ─────────────  │                     │  ─────────────  │           │
//! │  │  id (i64)       │ ◄────────────────── │  id (i64)       │           │
//! │  │  name           │  to_item (coerces)  │  name (text)    │           │
//! │  │  price (f64)    │  try_to_item        │  price (text)   │           │
//! │  │  quantity (i64) │    (strict)         │  quantity (text)│           │
//! │  └────────┬────────┘                     └─────────────────┘           │
//! │           │ for_purchase                                                │
//! │           ▼                                                             │
//! │  ┌─────────────────────┐                                               │
//! │  │   PurchaseDetails   │  ephemeral, display-only, never stored        │
//! │  └─────────────────────┘                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{self, is_blank, ValidationResult};
use crate::UNASSIGNED_ID;

// =============================================================================
// Item
// =============================================================================

/// A persisted inventory item.
///
/// `id` is assigned by the store on insert and never changes afterwards.
/// Storage does not enforce non-negative price or quantity; that is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Item {
    /// Store-assigned identity (0 until stored).
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unit price.
    pub price: f64,

    /// Units in stock.
    pub quantity: i64,
}

impl Item {
    /// Creates an item that has not been stored yet.
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Item {
            id: UNASSIGNED_ID,
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Returns a copy carrying the given id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn price_money(&self) -> Money {
        Money::from_price(self.price)
    }

    /// Currency display string for the unit price, e.g. `$10.99`.
    pub fn formatted_price(&self) -> String {
        self.price_money().to_string()
    }

    /// True when no units are left.
    #[inline]
    pub fn is_out_of_stock(&self) -> bool {
        self.quantity <= 0
    }

    /// Converts the item into an editable text draft.
    pub fn to_item_details(&self) -> ItemDetails {
        ItemDetails {
            id: self.id,
            name: self.name.clone(),
            price: self.price.to_string(),
            quantity: self.quantity.to_string(),
        }
    }
}

// =============================================================================
// Draft Status
// =============================================================================

/// Where a draft sits in the entry state machine.
///
/// ```text
/// Empty ──(any field changed)──► Editing ──► Valid   (Save enabled)
///                                       └──► Invalid (Save disabled)
/// ```
///
/// `Editing` is transitional: every edit immediately lands in `Valid` or
/// `Invalid`, so it has no variant of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Nothing typed yet.
    Empty,
    /// All required fields are filled in.
    Valid,
    /// At least one required field is blank.
    Invalid,
}

// =============================================================================
// Item Details (draft)
// =============================================================================

/// Editable text form of an item.
///
/// Fields are kept as free-form text until Save; see [`ItemDetails::to_item`]
/// for how text becomes numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDetails {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub quantity: String,
}

impl ItemDetails {
    /// Creates a draft for a new item.
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        ItemDetails {
            id: UNASSIGNED_ID,
            name: name.into(),
            price: price.into(),
            quantity: quantity.into(),
        }
    }

    /// Returns a copy carrying the given id.
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Blank check: name, price and quantity must all be non-blank.
    ///
    /// No numeric-format or range checks happen here.
    pub fn is_valid(&self) -> bool {
        !is_blank(&self.name) && !is_blank(&self.price) && !is_blank(&self.quantity)
    }

    /// Position of this draft in the entry state machine.
    pub fn draft_status(&self) -> DraftStatus {
        if self.name.is_empty() && self.price.is_empty() && self.quantity.is_empty() {
            DraftStatus::Empty
        } else if self.is_valid() {
            DraftStatus::Valid
        } else {
            DraftStatus::Invalid
        }
    }

    /// Converts the draft into an [`Item`], preserving `id`.
    ///
    /// Malformed price text becomes `0.0` and malformed quantity text
    /// becomes `0`. Surrounding whitespace counts as malformed. Use [`ItemDetails::try_to_item`] to reject such input
    /// instead.
    ///
    /// ```rust
    /// use inventory_core::ItemDetails;
    ///
    /// let item = ItemDetails::new("Pen", "abc", "3").to_item();
    /// assert_eq!(item.price, 0.0);
    /// assert_eq!(item.quantity, 3);
    /// ```
    pub fn to_item(&self) -> Item {
        let price = self
            .price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .unwrap_or(0.0);
        let quantity = self.quantity.parse::<i64>().unwrap_or(0);

        Item {
            id: self.id,
            name: self.name.clone(),
            price,
            quantity,
        }
    }

    /// Strict conversion: blank, malformed or negative fields are errors.
    pub fn try_to_item(&self) -> ValidationResult<Item> {
        validation::validate_item_name(&self.name)?;
        let price = validation::parse_price_text(&self.price)?;
        let quantity = validation::parse_quantity_text(&self.quantity)?;

        Ok(Item {
            id: self.id,
            name: self.name.trim().to_string(),
            price,
            quantity,
        })
    }
}

impl From<&Item> for ItemDetails {
    fn from(item: &Item) -> Self {
        item.to_item_details()
    }
}

// =============================================================================
// Purchase Details
// =============================================================================

/// Summary of a completed purchase, handed to the confirmation display.
///
/// Built at the moment of confirmation and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetails {
    pub product_name: String,
    /// Unit price as display text.
    pub price_per_item: String,
    pub quantity_ordered: i64,
    /// Unit price × quantity ordered, as display text.
    pub total_cost: String,
    /// Stock remaining after the purchase (never below zero).
    pub items_left_in_inventory: i64,
}

impl PurchaseDetails {
    /// Builds the summary for buying `quantity` units of `item`.
    ///
    /// ```rust
    /// use inventory_core::{Item, PurchaseDetails};
    ///
    /// let item = Item::new("TV", 300.0, 2).with_id(3);
    /// let details = PurchaseDetails::for_purchase(&item, 5).unwrap();
    /// assert_eq!(details.total_cost, "$1500.00");
    /// assert_eq!(details.items_left_in_inventory, 0);
    /// ```
    pub fn for_purchase(item: &Item, quantity: i64) -> ValidationResult<Self> {
        validation::validate_purchase_quantity(quantity)?;

        let unit_price = item.price_money();
        Ok(PurchaseDetails {
            product_name: item.name.clone(),
            price_per_item: unit_price.to_string(),
            quantity_ordered: quantity,
            total_cost: unit_price.multiply_quantity(quantity).to_string(),
            items_left_in_inventory: remaining_stock(item.quantity, quantity),
        })
    }
}

/// Stock left after removing `ordered` units, floored at zero.
#[inline]
pub fn remaining_stock(stock: i64, ordered: i64) -> i64 {
    stock.saturating_sub(ordered).max(0)
}

/// Returns a `Required` error naming the first blank field of a draft.
pub fn first_blank_field(details: &ItemDetails) -> Option<ValidationError> {
    [
        ("name", &details.name),
        ("price", &details.price),
        ("quantity", &details.quantity),
    ]
    .into_iter()
    .find(|(_, value)| is_blank(value))
    .map(|(field, _)| ValidationError::required(field))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_to_details_and_back() {
        let item = Item::new("Game", 100.0, 20).with_id(1);
        let details = item.to_item_details();
        assert_eq!(details.id, 1);
        assert_eq!(details.name, "Game");
        assert_eq!(details.quantity, "20");
        assert_eq!(details.to_item(), item);
    }

    #[test]
    fn test_out_of_stock() {
        assert!(Item::new("Pen", 1.0, 0).is_out_of_stock());
        assert!(Item::new("Pen", 1.0, -2).is_out_of_stock());
        assert!(!Item::new("Pen", 1.0, 1).is_out_of_stock());
    }

    #[test]
    fn test_formatted_price() {
        assert_eq!(Item::new("TV", 300.0, 1).formatted_price(), "$300.00");
        assert_eq!(Item::new("Gum", 0.5, 1).formatted_price(), "$0.50");
    }

    #[test]
    fn test_draft_validity_is_blank_check_only() {
        assert!(ItemDetails::new("Pen", "abc", "x").is_valid());
        assert!(!ItemDetails::new("Pen", "1.0", "").is_valid());
        assert!(!ItemDetails::new("  ", "1.0", "2").is_valid());
    }

    #[test]
    fn test_draft_status() {
        assert_eq!(ItemDetails::default().draft_status(), DraftStatus::Empty);
        assert_eq!(ItemDetails::new("P", "", "").draft_status(), DraftStatus::Invalid);
        assert_eq!(ItemDetails::new("P", "1", "1").draft_status(), DraftStatus::Valid);
    }

    #[test]
    fn test_to_item_coerces_malformed_numbers() {
        let item = ItemDetails::new("Pen", "abc", "ten").with_id(7).to_item();
        assert_eq!(item.id, 7);
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 0);

        let item = ItemDetails::new("Pen", "NaN", "3").to_item();
        assert_eq!(item.price, 0.0);

        let item = ItemDetails::new("Pen", "2.5 ", " 3").to_item();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 0);
    }

    #[test]
    fn test_try_to_item_rejects_malformed_numbers() {
        let err = ItemDetails::new("Pen", "abc", "3").try_to_item().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { ref field, .. } if field == "price"));

        let item = ItemDetails::new(" Pen ", "2.5", "3").try_to_item().unwrap();
        assert_eq!(item.name, "Pen");
        assert_eq!(item.price, 2.5);
    }

    #[test]
    fn test_purchase_details() {
        let item = Item::new("Pen", 2.99, 30).with_id(2);
        let details = PurchaseDetails::for_purchase(&item, 3).unwrap();
        assert_eq!(details.product_name, "Pen");
        assert_eq!(details.price_per_item, "$2.99");
        assert_eq!(details.quantity_ordered, 3);
        assert_eq!(details.total_cost, "$8.97");
        assert_eq!(details.items_left_in_inventory, 27);

        assert!(PurchaseDetails::for_purchase(&item, 0).is_err());
    }

    #[test]
    fn test_purchase_details_serializes_camel_case() {
        let item = Item::new("Pen", 1.0, 1);
        let details = PurchaseDetails::for_purchase(&item, 1).unwrap();
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["itemsLeftInInventory"], 0);
        assert_eq!(json["productName"], "Pen");
    }

    #[test]
    fn test_first_blank_field() {
        let details = ItemDetails::new("Pen", "", "");
        assert_eq!(first_blank_field(&details), Some(ValidationError::required("price")));
        assert_eq!(first_blank_field(&ItemDetails::new("a", "1", "1")), None);
    }

    #[test]
    fn test_remaining_stock() {
        assert_eq!(remaining_stock(5, 2), 3);
        assert_eq!(remaining_stock(2, 5), 0);
        assert_eq!(remaining_stock(0, 1), 0);
    }
}
