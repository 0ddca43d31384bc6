//! # Home Screen
//!
//! The item list with search.
//!
//! ## Search Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Debounced Search                                     │
//! │                                                                         │
//! │  search_product("p") ─┐                                                │
//! │  search_product("pe") ─┼──► search text (watch)                        │
//! │  search_product("pen")─┘        │                                       │
//! │                                 ▼                                       │
//! │                   every change restarts a 300 ms timer                 │
//! │                                 │ quiet for 300 ms                      │
//! │                                 ▼                                       │
//! │   all_items_stream() ───► filter(items, "pen") ───► HomeUiState        │
//! │        (live)              re-run on every                              │
//! │                            item change too                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only the newest search text is ever applied; intermediate keystrokes are
//! dropped. The text in effect when the producer starts is applied at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use inventory_core::Item;
use inventory_db::ItemsRepository;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};
use ts_rs::TS;

use crate::shared::{SharedState, StateSubscription};
use crate::UiConfig;

/// Quiet period before a search text change is applied.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// What the home screen shows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct HomeUiState {
    pub item_list: Vec<Item>,
}

/// Keeps items whose name contains `query` (ignoring case) or whose id is
/// exactly `query`. An empty query keeps everything.
///
/// ```rust
/// use inventory_core::Item;
/// use inventory_ui::home::filter_items;
///
/// let items = vec![Item::new("Pen", 2.0, 30).with_id(2)];
/// assert_eq!(filter_items(&items, "PE").len(), 1);
/// assert_eq!(filter_items(&items, "2").len(), 1);
/// assert!(filter_items(&items, "22").is_empty());
/// ```
pub fn filter_items(items: &[Item], query: &str) -> Vec<Item> {
    if query.is_empty() {
        return items.to_vec();
    }

    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&needle) || item.id.to_string() == query)
        .cloned()
        .collect()
}

/// View model for the home screen.
pub struct HomeViewModel {
    search_tx: watch::Sender<String>,
    passes: Arc<AtomicUsize>,
    state: SharedState<HomeUiState>,
}

impl HomeViewModel {
    pub fn new(repo: Arc<dyn ItemsRepository>) -> Self {
        Self::with_config(repo, &UiConfig::default())
    }

    pub fn with_config(repo: Arc<dyn ItemsRepository>, config: &UiConfig) -> Self {
        let (search_tx, search_rx) = watch::channel(String::new());
        let passes = Arc::new(AtomicUsize::new(0));
        let debounce = config.search_debounce;

        let producer_passes = Arc::clone(&passes);
        let state = SharedState::new(
            "home",
            HomeUiState::default(),
            config.stop_timeout,
            move |tx| {
                Box::pin(run_search(
                    Arc::clone(&repo),
                    search_rx.clone(),
                    tx,
                    debounce,
                    Arc::clone(&producer_passes),
                ))
            },
        );

        HomeViewModel {
            search_tx,
            passes,
            state,
        }
    }

    /// Sets the search text; applied after the debounce window.
    pub fn search_product(&self, text: impl Into<String>) {
        self.search_tx.send_replace(text.into());
    }

    /// The search text most recently entered (applied or not).
    pub fn search_text(&self) -> String {
        self.search_tx.borrow().clone()
    }

    /// Latest published state.
    pub fn ui_state(&self) -> HomeUiState {
        self.state.value()
    }

    /// Starts observing the screen state.
    pub fn subscribe(&self) -> StateSubscription<HomeUiState> {
        self.state.subscribe()
    }

    /// How many times the visible list has been derived.
    pub fn filter_passes(&self) -> usize {
        self.passes.load(Ordering::Relaxed)
    }

    /// True while the item stream is being observed.
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}

/// Producer: items × debounced search text → `HomeUiState`.
async fn run_search(
    repo: Arc<dyn ItemsRepository>,
    mut search_rx: watch::Receiver<String>,
    tx: Arc<watch::Sender<HomeUiState>>,
    debounce: Duration,
    passes: Arc<AtomicUsize>,
) {
    let mut items = match repo.all_items_stream().await {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "Could not observe items");
            return;
        }
    };

    let mut applied = search_rx.borrow_and_update().clone();
    let mut all = items.current();
    publish(&tx, &all, &applied, &passes);

    let timer = sleep(debounce);
    tokio::pin!(timer);
    let mut pending = false;

    loop {
        tokio::select! {
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                pending = true;
                timer.as_mut().reset(Instant::now() + debounce);
            }
            () = &mut timer, if pending => {
                pending = false;
                applied = search_rx.borrow_and_update().clone();
                debug!(query = %applied, "Search text applied");
                publish(&tx, &all, &applied, &passes);
            }
            snapshot = items.changed() => {
                match snapshot {
                    Some(latest) => {
                        all = latest;
                        publish(&tx, &all, &applied, &passes);
                    }
                    None => break,
                }
            }
        }
    }

    debug!("Home producer finished");
}

fn publish(
    tx: &watch::Sender<HomeUiState>,
    items: &[Item],
    query: &str,
    passes: &AtomicUsize,
) {
    let item_list = filter_items(items, query);
    passes.fetch_add(1, Ordering::Relaxed);
    debug!(query, shown = item_list.len(), total = items.len(), "List filtered");
    tx.send_replace(HomeUiState { item_list });
}

// =============================================================================
// Unit Tests
// =============================================================================
