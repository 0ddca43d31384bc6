//! # Live Queries
//!
//! Push-based query results: a subscriber gets the current snapshot right
//! away and a fresh one after every write that changes it.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Live Query Registry                                │
//! │                                                                         │
//! │  all_items()  ──► register ──► { 1: watch<Vec<Item>>,                  │
//! │                                   4: watch<Vec<Item>> }                │
//! │  item_by_id(2) ─► register ──► { 2: (id=2, watch<Option<Item>>) }     │
//! │                                                                         │
//! │  insert / update / delete (id = 2)                                     │
//! │       │  commit                                                         │
//! │       ▼                                                                 │
//! │  lock publish_lock                                                      │
//! │       ├── re-read all items ──► send_if_modified to 1, 4               │
//! │       └── re-read item 2    ──► send_if_modified to 2                  │
//! │  unlock                                                                 │
//! │                                                                         │
//! │  LiveQuery dropped / cancelled ──► entry removed from the registry     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Subscribing takes the same `publish_lock` while it reads the initial
//! snapshot, so a concurrent write is either already in that snapshot or
//! published to the new subscriber afterwards. Publishing re-reads under the
//! lock, which keeps snapshots for one subscriber in commit order.

use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use inventory_core::Item;
use parking_lot::Mutex;
use tokio::sync::{watch, MutexGuard};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::Stream;
use tracing::debug;

// =============================================================================
// LiveQuery
// =============================================================================

/// Runs a teardown action exactly once, when dropped.
struct SubscriptionGuard(Option<Box<dyn FnOnce() + Send + Sync>>);

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(release) = self.0.take() {
            release();
        }
    }
}

/// A live, continuously-updated query result.
///
/// Holds the latest snapshot and waits for the next one. The subscription
/// stays registered until this value (or the stream made from it) is
/// dropped; it never ends on its own.
///
/// ## Example
/// ```rust,ignore
/// let mut items = store.all_items().await?;
/// println!("now: {:?}", items.current());
///
/// while let Some(snapshot) = items.changed().await {
///     println!("changed: {:?}", snapshot);
/// }
/// ```
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
    guard: Option<SubscriptionGuard>,
}

impl<T: Clone> LiveQuery<T> {
    /// Wraps a registered receiver; `release` runs when the query is dropped.
    pub(crate) fn registered(
        rx: watch::Receiver<T>,
        release: impl FnOnce() + Send + Sync + 'static,
    ) -> Self {
        LiveQuery {
            rx,
            guard: Some(SubscriptionGuard(Some(Box::new(release)))),
        }
    }

    /// Wraps a plain watch receiver that no registry tracks.
    ///
    /// Useful for adapters and test doubles of `ItemsRepository`.
    pub fn from_receiver(rx: watch::Receiver<T>) -> Self {
        LiveQuery { rx, guard: None }
    }

    /// Returns the most recent snapshot.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next snapshot.
    ///
    /// Returns `None` once the publishing side has gone away (the store
    /// was dropped); a live store never ends the sequence on its own.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Stops observing. Equivalent to dropping the query.
    pub fn cancel(self) {}
}

impl<T: Clone + Send + Sync + 'static> LiveQuery<T> {
    /// Converts the query into a `Stream` that yields the current snapshot
    /// first, then every change.
    pub fn into_stream(self) -> LiveStream<T> {
        LiveStream {
            inner: WatchStream::new(self.rx),
            _guard: self.guard,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("current", &*self.rx.borrow())
            .field("registered", &self.guard.is_some())
            .finish()
    }
}

/// Stream form of a [`LiveQuery`]; dropping it ends the subscription.
pub struct LiveStream<T> {
    inner: WatchStream<T>,
    _guard: Option<SubscriptionGuard>,
}

impl<T: Clone + Send + Sync + 'static> Stream for LiveStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        Pin::new(&mut this.inner).poll_next(cx)
    }
}

// =============================================================================
// Registry
// =============================================================================

type AllItemsTx = Arc<watch::Sender<Vec<Item>>>;
type ItemTx = Arc<watch::Sender<Option<Item>>>;

/// Active item subscriptions for one database.
///
/// Shared by every `ItemStore` handed out by the same `Database`.
#[derive(Default)]
pub(crate) struct LiveRegistry {
    publish_lock: tokio::sync::Mutex<()>,
    next_key: AtomicU64,
    all_items: Mutex<HashMap<u64, AllItemsTx>>,
    by_id: Mutex<HashMap<u64, (i64, ItemTx)>>,
}

impl LiveRegistry {
    /// Serializes subscription and publication.
    pub(crate) async fn publish_guard(&self) -> MutexGuard<'_, ()> {
        self.publish_lock.lock().await
    }

    fn next_key(&self) -> u64 {
        self.next_key.fetch_add(1, Ordering::Relaxed)
    }

    /// Registers an all-items subscription seeded with `initial`.
    pub(crate) fn register_all(self: &Arc<Self>, initial: Vec<Item>) -> LiveQuery<Vec<Item>> {
        let key = self.next_key();
        let (tx, rx) = watch::channel(initial);
        self.all_items.lock().insert(key, Arc::new(tx));
        debug!(key, "All-items subscription registered");

        let registry: Weak<Self> = Arc::downgrade(self);
        LiveQuery::registered(rx, move || {
            if let Some(registry) = registry.upgrade() {
                registry.all_items.lock().remove(&key);
                debug!(key, "All-items subscription released");
            }
        })
    }

    /// Registers a by-id subscription seeded with `initial`.
    pub(crate) fn register_item(
        self: &Arc<Self>,
        id: i64,
        initial: Option<Item>,
    ) -> LiveQuery<Option<Item>> {
        let key = self.next_key();
        let (tx, rx) = watch::channel(initial);
        self.by_id.lock().insert(key, (id, Arc::new(tx)));
        debug!(key, item_id = id, "Item subscription registered");

        let registry: Weak<Self> = Arc::downgrade(self);
        LiveQuery::registered(rx, move || {
            if let Some(registry) = registry.upgrade() {
                registry.by_id.lock().remove(&key);
                debug!(key, item_id = id, "Item subscription released");
            }
        })
    }

    /// Senders of every open all-items subscription.
    pub(crate) fn all_items_senders(&self) -> Vec<AllItemsTx> {
        self.all_items.lock().values().cloned().collect()
    }

    /// Senders of every open subscription watching `id`.
    pub(crate) fn item_senders(&self, id: i64) -> Vec<ItemTx> {
        self.by_id
            .lock()
            .values()
            .filter(|(watched, _)| *watched == id)
            .map(|(_, tx)| Arc::clone(tx))
            .collect()
    }

    /// Number of open subscriptions of either kind.
    pub(crate) fn subscriber_count(&self) -> usize {
        self.all_items.lock().len() + self.by_id.lock().len()
    }
}

impl fmt::Debug for LiveRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveRegistry")
            .field("all_items", &self.all_items.lock().len())
            .field("by_id", &self.by_id.lock().len())
            .finish()
    }
}

/// Sends `value` unless the subscriber already holds an equal snapshot.
///
/// Returns true when a new snapshot was delivered.
pub(crate) fn publish<T: PartialEq>(tx: &watch::Sender<T>, value: T) -> bool {
    tx.send_if_modified(|current| {
        if *current == value {
            false
        } else {
            *current = value;
            true
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    fn pen() -> Item {
        Item::new("Pen", 2.0, 30).with_id(2)
    }

    #[tokio::test]
    async fn test_from_receiver_delivers_changes() {
        let (tx, rx) = watch::channel(0_u32);
        let mut query = LiveQuery::from_receiver(rx);
        assert_eq!(query.current(), 0);

        tx.send(5).unwrap();
        assert_eq!(query.changed().await, Some(5));

        drop(tx);
        assert_eq!(query.changed().await, None);
    }

    #[tokio::test]
    async fn test_dropping_query_releases_registration() {
        let registry = Arc::new(LiveRegistry::default());
        let all = registry.register_all(vec![]);
        let one = registry.register_item(2, None);
        assert_eq!(registry.subscriber_count(), 2);
        assert_eq!(registry.item_senders(2).len(), 1);
        assert!(registry.item_senders(3).is_empty());

        drop(all);
        assert_eq!(registry.subscriber_count(), 1);
        one.cancel();
        assert_eq!(registry.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_publish_skips_equal_snapshots() {
        let registry = Arc::new(LiveRegistry::default());
        let mut query = registry.register_item(2, Some(pen()));
        let tx = registry.item_senders(2).remove(0);

        assert!(!publish(&tx, Some(pen())));
        assert!(publish(&tx, None));
        assert_eq!(query.changed().await, Some(None));
    }

    #[tokio::test]
    async fn test_stream_yields_current_then_changes_and_releases_on_drop() {
        let registry = Arc::new(LiveRegistry::default());
        let mut stream = registry.register_all(vec![pen()]).into_stream();

        assert_eq!(stream.next().await, Some(vec![pen()]));

        let tx = registry.all_items_senders().remove(0);
        publish(&tx, vec![]);
        drop(tx);
        assert_eq!(stream.next().await, Some(vec![]));

        drop(stream);
        assert_eq!(registry.subscriber_count(), 0);
    }
}
