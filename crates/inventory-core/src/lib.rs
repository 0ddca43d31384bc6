//! # inventory-core: Pure Domain Logic for the Inventory App
//!
//! This crate holds the item model and every rule that can be expressed
//! without touching storage or the async runtime.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventory Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                Presentation (terminal / mobile UI)              │   │
//! │  │     List ──► Details ──► Entry / Edit ──► Purchase confirmation │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ UI state + intents                     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 inventory-ui (view models)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ inventory-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │   Item    │  │   Money   │  │ Validation│  │   rules   │  │   │
//! │  │   │  Draft    │  │  display  │  │   Error   │  │  parsing  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO RUNTIME • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 inventory-db (Database Layer)                   │   │
//! │  │          SQLite table, migrations, live queries, repository     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, ItemDetails draft, PurchaseDetails)
//! - [`money`] - Cent-based display type for prices and totals
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation and strict parsing
//!
//! ## Example Usage
//!
//! ```rust
//! use inventory_core::{Item, ItemDetails};
//!
//! let draft = ItemDetails::new("Pen", "1.50", "12");
//! assert!(draft.is_valid());
//!
//! let item: Item = draft.to_item();
//! assert_eq!(item.quantity, 12);
//! assert_eq!(item.formatted_price(), "$1.50");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::ValidationError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Id carried by an item that has not been stored yet.
///
/// The store assigns the real id on insert.
pub const UNASSIGNED_ID: i64 = 0;

/// Maximum length of an item name, in characters.
pub const MAX_NAME_LENGTH: usize = 200;
