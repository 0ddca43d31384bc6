//! # Application Container
//!
//! Owns the long-lived services and hands out view models.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppContainer                                                          │
//! │  ├── AppConfig                                                         │
//! │  ├── Database ─────────────┐                                           │
//! │  └── Arc<dyn ItemsRepository>  (OfflineItemsRepository over db.items())│
//! │            │                                                            │
//! │            ├──► home_view_model()                                      │
//! │            ├──► item_details_view_model(id)                            │
//! │            ├──► item_entry_view_model()                                │
//! │            └──► item_edit_view_model(id)                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Built once at startup and passed by reference; there is no global
//! database handle.

use std::sync::Arc;

use inventory_db::{Database, DbConfig, ItemsRepository, OfflineItemsRepository};
use inventory_ui::{
    HomeViewModel, ItemDetailsViewModel, ItemEditViewModel, ItemEntryViewModel, UiConfig,
    UiResult,
};
use tracing::info;

use crate::config::AppConfig;
use crate::error::AppResult;

/// Long-lived services for one run of the app.
pub struct AppContainer {
    config: AppConfig,
    ui: UiConfig,
    db: Database,
    repo: Arc<dyn ItemsRepository>,
}

impl AppContainer {
    /// Opens the configured database and wires the repository.
    pub async fn new(config: AppConfig) -> AppResult<Self> {
        let db = Database::new(config.db_config()?).await?;
        info!("Database connected and migrations applied");
        Ok(Self::from_database(config, db))
    }

    /// Container over a fresh in-memory database.
    pub async fn in_memory(config: AppConfig) -> AppResult<Self> {
        let db = Database::new(DbConfig::in_memory()).await?;
        Ok(Self::from_database(config, db))
    }

    /// Wires an already opened database.
    pub fn from_database(config: AppConfig, db: Database) -> Self {
        let repo: Arc<dyn ItemsRepository> = Arc::new(OfflineItemsRepository::new(db.items()));
        AppContainer {
            ui: config.ui_config(),
            config,
            db,
            repo,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn repository(&self) -> Arc<dyn ItemsRepository> {
        Arc::clone(&self.repo)
    }

    pub fn home_view_model(&self) -> HomeViewModel {
        HomeViewModel::with_config(self.repository(), &self.ui)
    }

    pub fn item_details_view_model(&self, item_id: i64) -> ItemDetailsViewModel {
        ItemDetailsViewModel::with_config(self.repository(), item_id, &self.ui)
    }

    pub fn item_entry_view_model(&self) -> ItemEntryViewModel {
        ItemEntryViewModel::new(self.repository())
    }

    pub async fn item_edit_view_model(&self, item_id: i64) -> UiResult<ItemEditViewModel> {
        ItemEditViewModel::load(self.repository(), item_id).await
    }

    /// Closes the database pool.
    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inventory_core::{Item, ItemDetails};

    #[tokio::test]
    async fn test_view_models_share_one_store() {
        let container = AppContainer::in_memory(AppConfig::default()).await.unwrap();

        let entry = container.item_entry_view_model();
        entry.update_ui_state(ItemDetails::new("Pen", "2", "30"));
        let id = entry.save_item().await.unwrap().unwrap();

        let details = container.item_details_view_model(id);
        let mut sub = details.subscribe();
        let state = sub.changed().await.unwrap();
        assert_eq!(state.item_details.name, "Pen");

        let edit = container.item_edit_view_model(id).await.unwrap();
        edit.update_ui_state(ItemDetails::new("Blue Pen", "2", "30"));
        assert!(edit.save_item().await.unwrap());

        let state = sub.changed().await.unwrap();
        assert_eq!(state.item_details.name, "Blue Pen");
        assert_eq!(
            container.database().items().get(id).await.unwrap(),
            Some(Item::new("Blue Pen", 2.0, 30).with_id(id))
        );
    }
}
