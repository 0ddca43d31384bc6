//! In-memory `ItemsRepository` for view-model tests.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use inventory_core::{Item, UNASSIGNED_ID};
use inventory_db::{DbError, DbResult, ItemsRepository, LiveQuery};
use parking_lot::Mutex;
use tokio::sync::watch;

/// Keeps items in memory and counts every call.
pub(crate) struct FakeRepository {
    all: watch::Sender<Vec<Item>>,
    by_id: Mutex<Vec<(i64, watch::Sender<Option<Item>>)>>,
    next_id: AtomicI64,
    pub writes: AtomicUsize,
    pub stream_opens: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl FakeRepository {
    pub fn new() -> Self {
        FakeRepository {
            all: watch::channel(Vec::new()).0,
            by_id: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
            writes: AtomicUsize::new(0),
            stream_opens: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Repository preloaded with Game, Pen and TV (ids 1, 2, 3).
    pub fn with_sample_items() -> Self {
        let repo = FakeRepository::new();
        repo.set_items(vec![
            Item::new("Game", 100.0, 20).with_id(1),
            Item::new("Pen", 200.0, 30).with_id(2),
            Item::new("TV", 300.0, 50).with_id(3),
        ]);
        repo.next_id.store(4, Ordering::SeqCst);
        repo
    }

    pub fn items(&self) -> Vec<Item> {
        self.all.borrow().clone()
    }

    pub fn get(&self, id: i64) -> Option<Item> {
        self.items().into_iter().find(|item| item.id == id)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.stream_opens.load(Ordering::SeqCst)
    }

    /// Replaces the whole table and notifies every stream.
    pub fn set_items(&self, mut items: Vec<Item>) {
        items.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        self.all.send_replace(items.clone());
        for (id, tx) in self.by_id.lock().iter() {
            let current = items.iter().find(|item| item.id == *id).cloned();
            tx.send_if_modified(|held| {
                if *held == current {
                    false
                } else {
                    *held = current;
                    true
                }
            });
        }
    }

    fn record_write(&self) -> DbResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DbError::Query("disk I/O error".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl ItemsRepository for FakeRepository {
    async fn all_items_stream(&self) -> DbResult<LiveQuery<Vec<Item>>> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        Ok(LiveQuery::from_receiver(self.all.subscribe()))
    }

    async fn item_stream(&self, id: i64) -> DbResult<LiveQuery<Option<Item>>> {
        self.stream_opens.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = watch::channel(self.get(id));
        self.by_id.lock().push((id, tx));
        Ok(LiveQuery::from_receiver(rx))
    }

    async fn insert_item(&self, item: &Item) -> DbResult<Option<i64>> {
        self.record_write()?;
        let id = if item.id == UNASSIGNED_ID {
            self.next_id.fetch_add(1, Ordering::SeqCst)
        } else if self.get(item.id).is_some() {
            return Ok(None);
        } else {
            item.id
        };
        let mut items = self.items();
        items.push(item.clone().with_id(id));
        self.set_items(items);
        Ok(Some(id))
    }

    async fn update_item(&self, item: &Item) -> DbResult<()> {
        self.record_write()?;
        let items = self
            .items()
            .into_iter()
            .map(|stored| if stored.id == item.id { item.clone() } else { stored })
            .collect();
        self.set_items(items);
        Ok(())
    }

    async fn delete_item(&self, item: &Item) -> DbResult<()> {
        self.record_write()?;
        let items = self
            .items()
            .into_iter()
            .filter(|stored| stored.id != item.id)
            .collect();
        self.set_items(items);
        Ok(())
    }
}
