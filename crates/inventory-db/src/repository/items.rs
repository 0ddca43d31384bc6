//! # Items Repository
//!
//! The seam between view models and storage. View models hold an
//! `Arc<dyn ItemsRepository>` and never see SQL, pools or the live-query
//! registry.

use async_trait::async_trait;

use crate::error::DbResult;
use crate::live::LiveQuery;
use crate::repository::item::ItemStore;
use inventory_core::Item;

/// Insert, update, delete and observe items.
///
/// Every method takes effect on the store as soon as it returns `Ok`; the
/// live queries returned by the stream methods have already seen the write.
#[async_trait]
pub trait ItemsRepository: Send + Sync {
    /// Live list of every item, ordered by name then id.
    async fn all_items_stream(&self) -> DbResult<LiveQuery<Vec<Item>>>;

    /// Live view of one item; `None` while it doesn't exist.
    async fn item_stream(&self, id: i64) -> DbResult<LiveQuery<Option<Item>>>;

    /// Inserts `item` and returns its id; `None` when an item with the same
    /// id already exists and nothing was written.
    async fn insert_item(&self, item: &Item) -> DbResult<Option<i64>>;

    /// Replaces the stored fields of `item.id`.
    async fn update_item(&self, item: &Item) -> DbResult<()>;

    /// Removes `item.id` from the store.
    async fn delete_item(&self, item: &Item) -> DbResult<()>;
}

/// Repository backed directly by the local SQLite store.
#[derive(Debug, Clone)]
pub struct OfflineItemsRepository {
    store: ItemStore,
}

impl OfflineItemsRepository {
    pub fn new(store: ItemStore) -> Self {
        OfflineItemsRepository { store }
    }
}

#[async_trait]
impl ItemsRepository for OfflineItemsRepository {
    async fn all_items_stream(&self) -> DbResult<LiveQuery<Vec<Item>>> {
        self.store.all_items().await
    }

    async fn item_stream(&self, id: i64) -> DbResult<LiveQuery<Option<Item>>> {
        self.store.item_by_id(id).await
    }

    async fn insert_item(&self, item: &Item) -> DbResult<Option<i64>> {
        self.store.insert(item).await
    }

    async fn update_item(&self, item: &Item) -> DbResult<()> {
        self.store.update(item).await
    }

    async fn delete_item(&self, item: &Item) -> DbResult<()> {
        self.store.delete(item).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_repository_passes_through_to_store() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo: Arc<dyn ItemsRepository> = Arc::new(OfflineItemsRepository::new(db.items()));

        let mut all = repo.all_items_stream().await.unwrap();
        let id = repo.insert_item(&Item::new("TV", 300.0, 50)).await.unwrap().unwrap();
        assert_eq!(all.changed().await.unwrap().len(), 1);

        let mut tv = repo.item_stream(id).await.unwrap();
        repo.update_item(&Item::new("TV", 300.0, 49).with_id(id)).await.unwrap();
        assert_eq!(tv.changed().await.unwrap().unwrap().quantity, 49);

        let duplicate = Item::new("Radio", 20.0, 1).with_id(id);
        assert_eq!(repo.insert_item(&duplicate).await.unwrap(), None);
        assert_eq!(tv.current().unwrap().name, "TV");

        repo.delete_item(&Item::new("TV", 300.0, 49).with_id(id)).await.unwrap();
        assert_eq!(tv.changed().await, Some(None));
        assert_eq!(db.items().count().await.unwrap(), 0);
    }
}
