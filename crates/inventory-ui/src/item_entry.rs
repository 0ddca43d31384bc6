//! # Item Entry Screen
//!
//! Draft for a new item. Save is available once name, price and quantity
//! are all non-blank; the text is then converted with
//! [`ItemDetails::to_item`], so malformed numbers are stored as zero.

use std::sync::Arc;

use inventory_core::{Item, ItemDetails};
use inventory_db::ItemsRepository;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::{UiError, UiResult};

/// Draft plus whether it may be saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemUiState {
    pub item_details: ItemDetails,
    pub is_entry_valid: bool,
}

impl ItemUiState {
    /// State for `details`, with validity computed from the draft.
    pub fn for_draft(details: ItemDetails) -> Self {
        let is_entry_valid = details.is_valid();
        ItemUiState {
            item_details: details,
            is_entry_valid,
        }
    }
}

/// Builds a draft state from a stored item.
pub trait ToItemUiState {
    fn to_item_ui_state(&self, is_entry_valid: bool) -> ItemUiState;
}

impl ToItemUiState for Item {
    fn to_item_ui_state(&self, is_entry_valid: bool) -> ItemUiState {
        ItemUiState {
            item_details: self.to_item_details(),
            is_entry_valid,
        }
    }
}

/// View model for the item entry screen.
pub struct ItemEntryViewModel {
    repo: Arc<dyn ItemsRepository>,
    state: watch::Sender<ItemUiState>,
}

impl ItemEntryViewModel {
    pub fn new(repo: Arc<dyn ItemsRepository>) -> Self {
        ItemEntryViewModel {
            repo,
            state: watch::channel(ItemUiState::default()).0,
        }
    }

    /// Current draft state.
    pub fn ui_state(&self) -> ItemUiState {
        self.state.borrow().clone()
    }

    /// Observes draft changes.
    pub fn subscribe(&self) -> watch::Receiver<ItemUiState> {
        self.state.subscribe()
    }

    /// Replaces the draft and recomputes whether it can be saved.
    pub fn update_ui_state(&self, details: ItemDetails) {
        self.state.send_replace(ItemUiState::for_draft(details));
    }

    /// Inserts the draft.
    ///
    /// Returns `Ok(None)` without writing when the draft has a blank field,
    /// and [`UiError::ItemExists`] when its id is already taken.
    pub async fn save_item(&self) -> UiResult<Option<i64>> {
        let state = self.ui_state();
        if !state.item_details.is_valid() {
            debug!("Draft incomplete, not saving");
            return Ok(None);
        }

        let item = state.item_details.to_item();
        let id = self
            .repo
            .insert_item(&item)
            .await?
            .ok_or(UiError::ItemExists(item.id))?;
        info!(id, name = %item.name, "Item saved");
        Ok(Some(id))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeRepository;

    #[test]
    fn test_validity_tracks_blank_fields() {
        let state = ItemUiState::for_draft(ItemDetails::new("Pen", "2", " "));
        assert!(!state.is_entry_valid);

        let state = ItemUiState::for_draft(ItemDetails::new("Pen", "2", "3"));
        assert!(state.is_entry_valid);
    }

    #[test]
    fn test_item_to_ui_state() {
        let state = Item::new("TV", 300.0, 50).with_id(3).to_item_ui_state(true);
        assert_eq!(state.item_details.id, 3);
        assert_eq!(state.item_details.price, "300");
        assert!(state.is_entry_valid);
    }

    #[tokio::test]
    async fn test_save_inserts_valid_draft() {
        let repo = Arc::new(FakeRepository::new());
        let vm = ItemEntryViewModel::new(Arc::clone(&repo) as Arc<dyn ItemsRepository>);

        vm.update_ui_state(ItemDetails::new("Pen", "2.50", "30"));
        assert!(vm.ui_state().is_entry_valid);

        let id = vm.save_item().await.unwrap().unwrap();
        assert_eq!(repo.get(id).unwrap(), Item::new("Pen", 2.5, 30).with_id(id));
    }

    #[tokio::test]
    async fn test_malformed_price_is_saved_as_zero() {
        let repo = Arc::new(FakeRepository::new());
        let vm = ItemEntryViewModel::new(Arc::clone(&repo) as Arc<dyn ItemsRepository>);

        vm.update_ui_state(ItemDetails::new("Pen", "abc", "3"));
        let id = vm.save_item().await.unwrap().unwrap();
        assert_eq!(repo.get(id).unwrap().price, 0.0);
    }

    #[tokio::test]
    async fn test_blank_quantity_blocks_save() {
        let repo = Arc::new(FakeRepository::new());
        let vm = ItemEntryViewModel::new(Arc::clone(&repo) as Arc<dyn ItemsRepository>);

        vm.update_ui_state(ItemDetails::new("Pen", "2", ""));
        assert!(!vm.ui_state().is_entry_valid);
        assert_eq!(vm.save_item().await.unwrap(), None);
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_taken_id_is_reported_not_saved() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let vm = ItemEntryViewModel::new(Arc::clone(&repo) as Arc<dyn ItemsRepository>);

        vm.update_ui_state(ItemDetails::new("Radio", "20", "1").with_id(2));
        let result = vm.save_item().await;

        assert!(matches!(result, Err(UiError::ItemExists(2))));
        assert_eq!(repo.get(2).unwrap().name, "Pen");
        assert_eq!(repo.items().len(), 3);
    }

    #[tokio::test]
    async fn test_subscribers_see_draft_edits() {
        let vm = ItemEntryViewModel::new(Arc::new(FakeRepository::new()));
        let mut rx = vm.subscribe();

        vm.update_ui_state(ItemDetails::new("P", "", ""));
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().item_details.name, "P");
    }
}
