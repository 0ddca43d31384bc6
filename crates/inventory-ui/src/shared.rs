//! # Shared UI State
//!
//! A published value whose producer only runs while someone is watching.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Producer Lifecycle                                   │
//! │                                                                         │
//! │   subscribers: 0 ──subscribe()──► 1 ──► spawn producer (fresh)         │
//! │                                   │                                     │
//! │                      more subscribe() / drop() while ≥ 1               │
//! │                                   │                                     │
//! │                  last subscription dropped                              │
//! │                                   ▼                                     │
//! │                    grace period (stop_timeout, 5 s)                    │
//! │                       │                     │                           │
//! │          subscribe() before expiry    expiry with 0 subscribers        │
//! │                       │                     │                           │
//! │                       ▼                     ▼                           │
//! │            keep the same producer     abort producer                   │
//! │                                       (last value kept)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The grace period keeps upstream queries alive across short gaps, such as
//! a screen being torn down and rebuilt.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::debug;

/// How long a producer outlives its last subscriber.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Boxed producer future.
pub type ProducerFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Starts a producer that publishes into the given sender.
type Producer<T> = Box<dyn Fn(Arc<watch::Sender<T>>) -> ProducerFuture + Send + Sync>;

#[derive(Default)]
struct Lifecycle {
    subscribers: usize,
    producer: Option<JoinHandle<()>>,
    stopper: Option<JoinHandle<()>>,
    /// Bumped on every subscribe and on every scheduled stop; a stopper
    /// only acts while its generation is still current.
    generation: u64,
}

impl Lifecycle {
    /// Aborts the producer if nobody subscribed since `generation` was taken.
    fn stop_if_idle(&mut self, generation: u64, name: &'static str) {
        if self.generation != generation {
            return;
        }
        self.stopper = None;
        if self.subscribers == 0 {
            if let Some(producer) = self.producer.take() {
                producer.abort();
                debug!(state = name, "Producer stopped");
            }
        }
    }
}

struct Inner<T> {
    name: &'static str,
    tx: Arc<watch::Sender<T>>,
    start: Producer<T>,
    stop_timeout: Duration,
    lifecycle: Arc<Mutex<Lifecycle>>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let mut life = self.lifecycle.lock();
        if let Some(producer) = life.producer.take() {
            producer.abort();
        }
        if let Some(stopper) = life.stopper.take() {
            stopper.abort();
        }
    }
}

/// UI state published by a lazily-started producer.
///
/// ## Example
/// ```rust,ignore
/// let state = SharedState::new("clock", 0_u64, STOP_TIMEOUT, |tx| {
///     Box::pin(async move {
///         for tick in 1.. {
///             tokio::time::sleep(Duration::from_secs(1)).await;
///             tx.send_replace(tick);
///         }
///     })
/// });
///
/// let mut sub = state.subscribe(); // producer starts here
/// let tick = sub.changed().await;
/// drop(sub);                        // producer stops 5 s later
/// ```
pub struct SharedState<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Clone + Send + Sync + 'static> SharedState<T> {
    /// Creates the state holder; nothing runs until the first `subscribe()`.
    pub fn new<F>(name: &'static str, initial: T, stop_timeout: Duration, start: F) -> Self
    where
        F: Fn(Arc<watch::Sender<T>>) -> ProducerFuture + Send + Sync + 'static,
    {
        let (tx, _) = watch::channel(initial);
        SharedState {
            inner: Arc::new(Inner {
                name,
                tx: Arc::new(tx),
                start: Box::new(start),
                stop_timeout,
                lifecycle: Arc::new(Mutex::new(Lifecycle::default())),
            }),
        }
    }

    /// Most recently published value.
    pub fn value(&self) -> T {
        self.inner.tx.borrow().clone()
    }

    /// Starts observing, starting the producer if it isn't running.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self) -> StateSubscription<T> {
        // Receiver first, so the producer's first value counts as a change.
        let rx = self.inner.tx.subscribe();

        let mut life = self.inner.lifecycle.lock();
        life.subscribers += 1;
        life.generation += 1;

        if let Some(stopper) = life.stopper.take() {
            stopper.abort();
            debug!(state = self.inner.name, "Pending stop cancelled");
        }

        let running = life
            .producer
            .as_ref()
            .is_some_and(|producer| !producer.is_finished());
        if !running {
            let future = (self.inner.start)(Arc::clone(&self.inner.tx));
            life.producer = Some(tokio::spawn(future));
            debug!(state = self.inner.name, "Producer started");
        }

        StateSubscription {
            rx,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.lifecycle.lock().subscribers
    }

    /// True while the producer task is alive.
    pub fn is_active(&self) -> bool {
        self.inner
            .lifecycle
            .lock()
            .producer
            .as_ref()
            .is_some_and(|producer| !producer.is_finished())
    }
}

/// An active observer of a [`SharedState`].
///
/// Dropping it releases the observer; the producer stops after the grace
/// period if no other subscription remains.
pub struct StateSubscription<T> {
    rx: watch::Receiver<T>,
    inner: Arc<Inner<T>>,
}

impl<T: Clone> StateSubscription<T> {
    /// Latest value.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next published value.
    ///
    /// The first call after `subscribe()` returns the producer's first value
    /// when this subscription started the producer.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

impl<T> Drop for StateSubscription<T> {
    fn drop(&mut self) {
        let mut life = self.inner.lifecycle.lock();
        life.subscribers = life.subscribers.saturating_sub(1);
        if life.subscribers > 0 {
            return;
        }

        match Handle::try_current() {
            Ok(runtime) => {
                life.generation += 1;
                let generation = life.generation;
                let lifecycle: Weak<Mutex<Lifecycle>> = Arc::downgrade(&self.inner.lifecycle);
                let name = self.inner.name;
                let grace = self.inner.stop_timeout;
                life.stopper = Some(runtime.spawn(async move {
                    sleep(grace).await;
                    if let Some(lifecycle) = lifecycle.upgrade() {
                        lifecycle.lock().stop_if_idle(generation, name);
                    }
                }));
            }
            Err(_) => {
                // Outside a runtime there is no timer to wait on.
                if let Some(producer) = life.producer.take() {
                    producer.abort();
                }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts producer starts and publishes the start number, then idles.
    fn counting_state(starts: Arc<AtomicUsize>) -> SharedState<usize> {
        SharedState::new("test", 0, STOP_TIMEOUT, move |tx| {
            let starts = Arc::clone(&starts);
            Box::pin(async move {
                let n = starts.fetch_add(1, Ordering::SeqCst) + 1;
                tx.send_replace(n);
                std::future::pending::<()>().await;
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_starts_lazily() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));
        assert!(!state.is_active());
        assert_eq!(state.value(), 0);

        let mut sub = state.subscribe();
        assert_eq!(sub.changed().await, Some(1));
        assert_eq!(state.value(), 1);
        assert_eq!(state.subscriber_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_within_grace_keeps_producer() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));

        let mut sub = state.subscribe();
        sub.changed().await;
        drop(sub);

        sleep(Duration::from_secs(4)).await;
        assert!(state.is_active());

        let _sub = state.subscribe();
        sleep(Duration::from_secs(10)).await;
        assert!(state.is_active());
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_producer_stops_after_grace_and_restarts_fresh() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));

        let mut sub = state.subscribe();
        sub.changed().await;
        drop(sub);

        sleep(STOP_TIMEOUT + Duration::from_millis(1)).await;
        assert!(!state.is_active());
        // Last value survives the stop.
        assert_eq!(state.value(), 1);

        let mut sub = state.subscribe();
        assert_eq!(sub.changed().await, Some(2));
        assert_eq!(starts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_subscriber_shares_producer() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));

        let mut first = state.subscribe();
        first.changed().await;
        let second = state.subscribe();
        assert_eq!(second.current(), 1);
        assert_eq!(state.subscriber_count(), 2);

        drop(first);
        sleep(Duration::from_secs(30)).await;
        assert!(state.is_active());
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_stopper_leaves_newer_grace_period() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));

        let mut sub = state.subscribe();
        sub.changed().await;
        drop(sub);
        let stale = state.inner.lifecycle.lock().generation;

        let sub = state.subscribe();
        drop(sub);

        // A stopper from the first drop that woke late must not act.
        state.inner.lifecycle.lock().stop_if_idle(stale, "test");
        assert!(state.is_active());
        assert!(state.inner.lifecycle.lock().stopper.is_some());

        sleep(Duration::from_secs(4)).await;
        assert!(state.is_active());

        sleep(Duration::from_secs(2)).await;
        assert!(!state.is_active());
        assert_eq!(starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_subscription_moves_across_tasks() {
        let starts = Arc::new(AtomicUsize::new(0));
        let state = counting_state(Arc::clone(&starts));

        let mut sub = state.subscribe();
        let first = tokio::spawn(async move {
            let value = sub.changed().await;
            drop(sub);
            value
        })
        .await
        .unwrap();

        assert_eq!(first, Some(1));
        assert_eq!(state.subscriber_count(), 0);
    }
}
