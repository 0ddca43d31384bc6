//! # Item Store
//!
//! Database operations for inventory items, plus the live queries that
//! observe them.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How A Write Reaches Observers                        │
//! │                                                                         │
//! │  store.update(&pen)                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE items SET ... WHERE id = 2      (autocommit)                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  publish_change(2)  ── under publish_lock                              │
//! │       ├── any all_items() open?   → SELECT ... ORDER BY name, id       │
//! │       └── any item_by_id(2) open? → SELECT ... WHERE id = 2            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Ok(())  ← every observer already holds the new snapshot              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Absent items are not errors: `get` and `item_by_id` yield `None`, and
//! updating or deleting an absent id changes nothing.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use crate::live::{publish, LiveQuery, LiveRegistry};
use inventory_core::{Item, UNASSIGNED_ID};

/// Store for item database operations.
///
/// ## Usage
/// ```rust,ignore
/// let store = db.items();
///
/// let id = store.insert(&Item::new("Pen", 2.0, 30)).await?.expect("new id");
/// let mut pen = store.item_by_id(id).await?;
/// store.delete(&pen.current().unwrap()).await?;
/// assert_eq!(pen.changed().await, Some(None));
/// ```
#[derive(Debug, Clone)]
pub struct ItemStore {
    pool: SqlitePool,
    live: Arc<LiveRegistry>,
}

impl ItemStore {
    /// Creates a new ItemStore publishing to `live`.
    pub(crate) fn new(pool: SqlitePool, live: Arc<LiveRegistry>) -> Self {
        ItemStore { pool, live }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a new item.
    ///
    /// ## Id Assignment
    /// - `item.id == 0`: the database assigns the next id
    /// - any other id: used as-is; if a row with that id already exists the
    ///   insert is ignored and nothing is published
    ///
    /// ## Returns
    /// The id of the new row, or `None` when the insert was ignored.
    pub async fn insert(&self, item: &Item) -> DbResult<Option<i64>> {
        debug!(name = %item.name, id = item.id, "Inserting item");

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO items (id, name, price, quantity)
            VALUES (NULLIF(?1, ?5), ?2, ?3, ?4)
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .bind(UNASSIGNED_ID)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(id = item.id, "Item id already exists, insert ignored");
            return Ok(None);
        }

        let id = result.last_insert_rowid();
        self.publish_change(id).await?;

        debug!(id, "Item inserted");
        Ok(Some(id))
    }

    /// Replaces name, price and quantity of the item with `item.id`.
    ///
    /// Updating an id that doesn't exist is a no-op.
    pub async fn update(&self, item: &Item) -> DbResult<()> {
        debug!(id = item.id, quantity = item.quantity, "Updating item");

        let result = sqlx::query(
            r#"
            UPDATE items
            SET name = ?2, price = ?3, quantity = ?4
            WHERE id = ?1
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(item.price)
        .bind(item.quantity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            debug!(id = item.id, "No item with this id, nothing updated");
            return Ok(());
        }

        self.publish_change(item.id).await
    }

    /// Deletes the item with `item.id`.
    ///
    /// Deleting an id that doesn't exist is a no-op.
    pub async fn delete(&self, item: &Item) -> DbResult<()> {
        debug!(id = item.id, "Deleting item");

        let result = sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(item.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            debug!(id = item.id, "No item with this id, nothing deleted");
            return Ok(());
        }

        self.publish_change(item.id).await
    }

    // =========================================================================
    // One-shot Reads
    // =========================================================================

    /// Gets an item by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<Item>> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, quantity FROM items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Lists all items, ordered by name then id.
    pub async fn list(&self) -> DbResult<Vec<Item>> {
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, name, price, quantity FROM items ORDER BY name ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Counts all items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Live Queries
    // =========================================================================

    /// Observes all items, ordered by name then id.
    pub async fn all_items(&self) -> DbResult<LiveQuery<Vec<Item>>> {
        let _guard = self.live.publish_guard().await;
        let items = self.list().await?;
        Ok(self.live.register_all(items))
    }

    /// Observes one item; the snapshot is `None` while no such item exists.
    pub async fn item_by_id(&self, id: i64) -> DbResult<LiveQuery<Option<Item>>> {
        let _guard = self.live.publish_guard().await;
        let item = self.get(id).await?;
        Ok(self.live.register_item(id, item))
    }

    /// Re-reads and publishes every live query affected by a write to `id`.
    ///
    /// The write has already committed when this runs; an error here means
    /// the observers could not be refreshed.
    async fn publish_change(&self, id: i64) -> DbResult<()> {
        let _guard = self.live.publish_guard().await;

        let all_items = self.live.all_items_senders();
        if !all_items.is_empty() {
            let items = self.list().await?;
            let delivered = all_items
                .iter()
                .filter(|tx| publish(tx, items.clone()))
                .count();
            debug!(delivered, "Published all-items snapshot");
        }

        let watchers = self.live.item_senders(id);
        if !watchers.is_empty() {
            let item = self.get(id).await?;
            let delivered = watchers
                .iter()
                .filter(|tx| publish(tx, item.clone()))
                .count();
            debug!(id, delivered, "Published item snapshot");
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
