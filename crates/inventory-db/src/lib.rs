//! # inventory-db: Database Layer for the Inventory App
//!
//! This crate provides item storage for the inventory app. It uses SQLite
//! for local storage with sqlx for async operations, and pushes changes to
//! live queries after every committed write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Inventory Data Flow                              │
//! │                                                                         │
//! │  View model (HomeViewModel, ItemDetailsViewModel, ...)                 │
//! │       │  Arc<dyn ItemsRepository>                                      │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  inventory-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repository   │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (item.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ItemStore     │    │ 001_create_  │  │   │
//! │  │   │ LiveRegistry  │    │ ItemsRepo     │    │   items.sql  │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <platform data dir>/inventory.db                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`live`] - Live query handles
//! - [`repository`] - Item store and the repository seam
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inventory_db::{Database, DbConfig, ItemsRepository, OfflineItemsRepository};
//!
//! let db = Database::new(DbConfig::new("path/to/inventory.db")).await?;
//! let repo = OfflineItemsRepository::new(db.items());
//!
//! let mut items = repo.all_items_stream().await?;
//! repo.insert_item(&Item::new("Pen", 2.0, 30)).await?;
//! let latest = items.changed().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod live;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use live::{LiveQuery, LiveStream};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::item::ItemStore;
pub use repository::items::{ItemsRepository, OfflineItemsRepository};
