//! # Repository Module
//!
//! Storage access for inventory items.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layers                                    │
//! │                                                                         │
//! │  View model                                                            │
//! │       │  repo.item_stream(2) / repo.update_item(&pen)                  │
//! │       ▼                                                                 │
//! │  dyn ItemsRepository          (items.rs, the seam view models see)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OfflineItemsRepository       (pure pass-through)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ItemStore                    (item.rs, SQL + live publication)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Types
//!
//! - [`ItemStore`] - Item CRUD and live queries
//! - [`ItemsRepository`] - Trait the view models depend on
//! - [`OfflineItemsRepository`] - Local-only implementation

pub mod item;
pub mod items;

pub use item::ItemStore;
pub use items::{ItemsRepository, OfflineItemsRepository};
