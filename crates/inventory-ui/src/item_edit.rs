//! # Item Edit Screen
//!
//! Draft for an existing item, seeded once from the store. Later changes to
//! the stored item do not overwrite the draft.

use std::sync::Arc;

use inventory_core::ItemDetails;
use inventory_db::ItemsRepository;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::UiResult;
use crate::item_entry::{ItemUiState, ToItemUiState};

/// View model for the item edit screen.
pub struct ItemEditViewModel {
    item_id: i64,
    found: bool,
    repo: Arc<dyn ItemsRepository>,
    state: watch::Sender<ItemUiState>,
}

impl ItemEditViewModel {
    /// Reads the item once and seeds the draft from it.
    ///
    /// A stored item gives a draft marked valid. A missing item gives an
    /// empty draft, which can't be saved until filled in.
    pub async fn load(repo: Arc<dyn ItemsRepository>, item_id: i64) -> UiResult<Self> {
        let query = repo.item_stream(item_id).await?;
        let found = query.current().is_some();
        let initial = match query.current() {
            Some(item) => item.to_item_ui_state(true),
            None => {
                debug!(item_id, "Item not found, starting with an empty draft");
                ItemUiState::for_draft(ItemDetails::default().with_id(item_id))
            }
        };
        query.cancel();

        Ok(ItemEditViewModel {
            item_id,
            found,
            repo,
            state: watch::channel(initial).0,
        })
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    /// Whether the item existed when the draft was seeded.
    pub fn item_exists(&self) -> bool {
        self.found
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
    ///
    /// The edited item's id is kept whatever `details.id` says.
    pub fn update_ui_state(&self, details: ItemDetails) {
        let details = details.with_id(self.item_id);
        self.state.send_replace(ItemUiState::for_draft(details));
    }

    /// Writes the draft over the stored item.
    ///
    /// Returns `Ok(false)` without writing when the draft has a blank field.
    pub async fn save_item(&self) -> UiResult<bool> {
        let state = self.ui_state();
        if !state.item_details.is_valid() {
            debug!(item_id = self.item_id, "Draft incomplete, not saving");
            return Ok(false);
        }

        let item = state.item_details.to_item();
        self.repo.update_item(&item).await?;
        info!(id = item.id, name = %item.name, "Item updated");
        Ok(true)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
