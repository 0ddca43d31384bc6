//! # inventory-ui: View Models for the Inventory App
//!
//! Screen state and user actions, independent of any rendering toolkit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventory UI Flow                                │
//! │                                                                         │
//! │  Front-end (CLI today)                                                 │
//! │       │ intents: search_product, reduce_quantity_by_one, save_item     │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  inventory-ui (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   HomeViewModel ──────────┐                                     │   │
//! │  │   ItemDetailsViewModel ───┼──► SharedState (lazy producer,      │   │
//! │  │                           │     5 s grace after last observer)  │   │
//! │  │   ItemEntryViewModel      │                                     │   │
//! │  │   ItemEditViewModel       │    plain watch draft state          │   │
//! │  └───────────────────────────┼─────────────────────────────────────┘   │
//! │       │ states               │ Arc<dyn ItemsRepository>                │
//! │       ▼                      ▼                                          │
//! │  Front-end renders      inventory-db                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`home`] - Item list with debounced search
//! - [`item_details`] - One item with sell / purchase / delete
//! - [`item_entry`] - New-item draft
//! - [`item_edit`] - Existing-item draft
//! - [`shared`] - Lazily started, shared UI state
//! - [`error`] - UI error types

use std::time::Duration;

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod home;
pub mod item_details;
pub mod item_edit;
pub mod item_entry;
pub mod shared;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{UiError, UiResult};
pub use home::{HomeUiState, HomeViewModel, SEARCH_DEBOUNCE};
pub use item_details::{ItemDetailsUiState, ItemDetailsViewModel};
pub use item_edit::ItemEditViewModel;
pub use item_entry::{ItemEntryViewModel, ItemUiState, ToItemUiState};
pub use shared::{SharedState, StateSubscription, STOP_TIMEOUT};

// =============================================================================
// Configuration
// =============================================================================

/// Timing knobs shared by the view models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiConfig {
    /// Quiet period before a search text change is applied.
    pub search_debounce: Duration,

    /// How long an unobserved screen keeps its store queries open.
    pub stop_timeout: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            search_debounce: SEARCH_DEBOUNCE,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}
