//! # Item Details Screen
//!
//! One item, observed live, with sell / purchase / delete actions.
//!
//! Actions read the most recently observed snapshot and write through the
//! repository in a spawned task. The returned `JoinHandle` reports the
//! outcome; dropping it does not cancel the write. Two screens acting on
//! the same item race, and the last write wins.

use std::sync::Arc;

use inventory_core::{remaining_stock, Item, ItemDetails, PurchaseDetails, UNASSIGNED_ID};
use inventory_db::ItemsRepository;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::UiResult;
use crate::shared::{SharedState, StateSubscription};
use crate::UiConfig;

/// What the details screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ItemDetailsUiState {
    pub out_of_stock: bool,
    pub item_details: ItemDetails,
}

/// Shown before the item is loaded and when it doesn't exist.
impl Default for ItemDetailsUiState {
    fn default() -> Self {
        ItemDetailsUiState {
            out_of_stock: true,
            item_details: ItemDetails::default(),
        }
    }
}

impl From<Option<Item>> for ItemDetailsUiState {
    fn from(item: Option<Item>) -> Self {
        match item {
            Some(item) => ItemDetailsUiState {
                out_of_stock: item.is_out_of_stock(),
                item_details: item.to_item_details(),
            },
            None => ItemDetailsUiState::default(),
        }
    }
}

/// View model for the item details screen.
pub struct ItemDetailsViewModel {
    item_id: i64,
    repo: Arc<dyn ItemsRepository>,
    state: SharedState<ItemDetailsUiState>,
}

impl ItemDetailsViewModel {
    pub fn new(repo: Arc<dyn ItemsRepository>, item_id: i64) -> Self {
        Self::with_config(repo, item_id, &UiConfig::default())
    }

    pub fn with_config(repo: Arc<dyn ItemsRepository>, item_id: i64, config: &UiConfig) -> Self {
        let upstream = Arc::clone(&repo);
        let state = SharedState::new(
            "item_details",
            ItemDetailsUiState::default(),
            config.stop_timeout,
            move |tx| Box::pin(observe_item(Arc::clone(&upstream), item_id, tx)),
        );

        ItemDetailsViewModel {
            item_id,
            repo,
            state,
        }
    }

    pub fn item_id(&self) -> i64 {
        self.item_id
    }

    /// Latest published state.
    pub fn ui_state(&self) -> ItemDetailsUiState {
        self.state.value()
    }

    /// Starts observing the screen state.
    pub fn subscribe(&self) -> StateSubscription<ItemDetailsUiState> {
        self.state.subscribe()
    }

    /// Sells one unit.
    ///
    /// Resolves to `Ok(false)` without writing when the item is already out
    /// of stock or hasn't been observed.
    pub fn reduce_quantity_by_one(&self) -> JoinHandle<UiResult<bool>> {
        let repo = Arc::clone(&self.repo);
        let snapshot = self.state.value();

        tokio::spawn(async move {
            let item = snapshot.item_details.to_item();
            if item.id == UNASSIGNED_ID || item.quantity <= 0 {
                debug!(id = item.id, "Nothing to sell");
                return Ok(false);
            }

            let quantity = item.quantity - 1;
            repo.update_item(&Item { quantity, ..item }).await?;
            debug!(quantity, "Sold one unit");
            Ok(true)
        })
    }

    /// Buys `quantity` units, flooring the stock at zero.
    ///
    /// Resolves to the confirmation summary, or `None` when no item has been
    /// observed. A non-positive quantity is a validation error.
    pub fn purchase(&self, quantity: i64) -> JoinHandle<UiResult<Option<PurchaseDetails>>> {
        let repo = Arc::clone(&self.repo);
        let snapshot = self.state.value();

        tokio::spawn(async move {
            let item = snapshot.item_details.to_item();
            if item.id == UNASSIGNED_ID {
                return Ok(None);
            }

            let details = PurchaseDetails::for_purchase(&item, quantity)?;
            let left = remaining_stock(item.quantity, quantity);
            repo.update_item(&Item {
                quantity: left,
                ..item
            })
            .await?;

            info!(
                product = %details.product_name,
                ordered = quantity,
                left,
                "Purchase recorded"
            );
            Ok(Some(details))
        })
    }

    /// Removes the observed item.
    ///
    /// Resolves to `Ok(false)` when no item has been observed.
    pub fn delete_item(&self) -> JoinHandle<UiResult<bool>> {
        let repo = Arc::clone(&self.repo);
        let snapshot = self.state.value();

        tokio::spawn(async move {
            let item = snapshot.item_details.to_item();
            if item.id == UNASSIGNED_ID {
                return Ok(false);
            }

            repo.delete_item(&item).await?;
            info!(id = item.id, "Item deleted");
            Ok(true)
        })
    }
}

/// Producer: `item_stream(id)` → `ItemDetailsUiState`.
async fn observe_item(
    repo: Arc<dyn ItemsRepository>,
    item_id: i64,
    tx: Arc<watch::Sender<ItemDetailsUiState>>,
) {
    let mut item = match repo.item_stream(item_id).await {
        Ok(query) => query,
        Err(e) => {
            warn!(item_id, error = %e, "Could not observe item");
            return;
        }
    };

    tx.send_replace(item.current().into());
    while let Some(snapshot) = item.changed().await {
        tx.send_replace(snapshot.into());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UiError;
    use crate::testing::FakeRepository;
    use std::sync::atomic::Ordering;

    async fn loaded(repo: &Arc<FakeRepository>, id: i64) -> (ItemDetailsViewModel, StateSubscription<ItemDetailsUiState>) {
        let vm = ItemDetailsViewModel::new(Arc::clone(repo) as Arc<dyn ItemsRepository>, id);
        let mut sub = vm.subscribe();
        sub.changed().await;
        (vm, sub)
    }

    #[tokio::test]
    async fn test_state_maps_item() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, _sub) = loaded(&repo, 2).await;

        let state = vm.ui_state();
        assert!(!state.out_of_stock);
        assert_eq!(state.item_details.name, "Pen");
        assert_eq!(state.item_details.quantity, "30");
    }

    #[tokio::test]
    async fn test_absent_item_shows_default_state() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, _sub) = loaded(&repo, 42).await;

        assert_eq!(vm.ui_state(), ItemDetailsUiState::default());
        assert!(vm.ui_state().out_of_stock);
        assert!(!vm.delete_item().await.unwrap().unwrap());
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_sell_reduces_quantity_and_state_follows() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, mut sub) = loaded(&repo, 2).await;

        assert!(vm.reduce_quantity_by_one().await.unwrap().unwrap());
        let state = sub.changed().await.unwrap();
        assert_eq!(state.item_details.quantity, "29");
        assert_eq!(repo.get(2).unwrap().quantity, 29);
    }

    #[tokio::test]
    async fn test_sell_at_zero_issues_no_write() {
        let repo = Arc::new(FakeRepository::new());
        repo.set_items(vec![Item::new("Lamp", 15.0, 0).with_id(9)]);
        let (vm, _sub) = loaded(&repo, 9).await;
        assert!(vm.ui_state().out_of_stock);

        assert!(!vm.reduce_quantity_by_one().await.unwrap().unwrap());
        assert_eq!(repo.write_count(), 0);
        assert_eq!(repo.get(9).unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_purchase_floors_stock_at_zero() {
        let repo = Arc::new(FakeRepository::new());
        repo.set_items(vec![Item::new("TV", 300.0, 2).with_id(3)]);
        let (vm, _sub) = loaded(&repo, 3).await;

        let details = vm.purchase(5).await.unwrap().unwrap().unwrap();
        assert_eq!(details.total_cost, "$1500.00");
        assert_eq!(details.items_left_in_inventory, 0);
        assert_eq!(repo.get(3).unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_purchase_rejects_non_positive_quantity() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, _sub) = loaded(&repo, 3).await;

        let result = vm.purchase(0).await.unwrap();
        assert!(matches!(result, Err(UiError::Validation(_))));
        assert_eq!(repo.write_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_item() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, mut sub) = loaded(&repo, 1).await;

        assert!(vm.delete_item().await.unwrap().unwrap());
        assert_eq!(sub.changed().await.unwrap(), ItemDetailsUiState::default());
        assert!(repo.get(1).is_none());
    }

    #[tokio::test]
    async fn test_storage_failure_reaches_caller() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, _sub) = loaded(&repo, 2).await;
        repo.fail_writes.store(true, Ordering::SeqCst);

        let result = vm.reduce_quantity_by_one().await.unwrap();
        assert!(matches!(result, Err(UiError::Db(_))));
        assert_eq!(repo.get(2).unwrap().quantity, 30);
    }

    #[tokio::test]
    async fn test_write_completes_after_handle_dropped() {
        let repo = Arc::new(FakeRepository::with_sample_items());
        let (vm, mut sub) = loaded(&repo, 2).await;

        drop(vm.reduce_quantity_by_one());
        let state = sub.changed().await.unwrap();
        assert_eq!(state.item_details.quantity, "29");
    }
}
