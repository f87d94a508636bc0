#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures::StreamExt;

use fridge_core::{
    ChangeStream, FoodItem, FoodItemWithDate, FoodLookup, InMemoryStore, LookupError,
    MemorySelectionStore, RecordingSink, RemoteStore, SessionContext, StoreError,
};

pub fn food(name: &str) -> FoodItem {
    FoodItem::new(name, "Generic foods", 100, 5)
}

pub fn dated(name: &str, date: &str) -> FoodItemWithDate {
    FoodItemWithDate::new(food(name), date)
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn names(items: &[FoodItemWithDate]) -> Vec<String> {
    let mut names: Vec<String> = items.iter().map(|i| i.food_item.name.clone()).collect();
    names.sort();
    names
}

/// Wraps an [`InMemoryStore`] and fails chosen operations.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: InMemoryStore,
    fail_delete: AtomicBool,
    fail_push: Mutex<HashSet<String>>,
    pushes: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Rejects pushes of items with this name.
    pub fn fail_push_of(&self, name: &str) {
        self.fail_push.lock().unwrap().insert(name.to_string());
    }

    /// Push attempts seen, successful or not.
    pub fn push_attempts(&self) -> usize {
        self.pushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteStore for FlakyStore {
    async fn read_children(&self, path: &str) -> Result<Vec<FoodItemWithDate>, StoreError> {
        self.inner.read_children(path).await
    }

    async fn delete_all(&self, path: &str) -> Result<(), StoreError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::write(path, "permission denied"));
        }
        self.inner.delete_all(path).await
    }

    async fn push_child(&self, path: &str, item: &FoodItemWithDate) -> Result<String, StoreError> {
        self.pushes.fetch_add(1, Ordering::SeqCst);
        if self.fail_push.lock().unwrap().contains(&item.food_item.name) {
            return Err(StoreError::write(path, "quota exceeded"));
        }
        self.inner.push_child(path, item).await
    }

    async fn changes(&self, path: &str) -> Result<ChangeStream, StoreError> {
        self.inner.changes(path).await
    }
}

/// Wraps an [`InMemoryStore`] whose change feed reports one change shortly
/// after it opens, the way a Firebase listener announces the current value.
#[derive(Default)]
pub struct AnnouncingStore {
    pub inner: InMemoryStore,
}

#[async_trait]
impl RemoteStore for AnnouncingStore {
    async fn read_children(&self, path: &str) -> Result<Vec<FoodItemWithDate>, StoreError> {
        self.inner.read_children(path).await
    }

    async fn delete_all(&self, path: &str) -> Result<(), StoreError> {
        self.inner.delete_all(path).await
    }

    async fn push_child(&self, path: &str, item: &FoodItemWithDate) -> Result<String, StoreError> {
        self.inner.push_child(path, item).await
    }

    async fn changes(&self, path: &str) -> Result<ChangeStream, StoreError> {
        let live = self.inner.changes(path).await?;
        let announce = futures::stream::once(async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok::<(), StoreError>(())
        });
        Ok(Box::pin(announce.chain(live)))
    }
}

/// Lookup answering from a fixed table, or failing for unknown queries.
pub struct StubLookup {
    table: HashMap<String, Result<Vec<FoodItem>, LookupError>>,
}

impl StubLookup {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn with(mut self, query: &str, answer: Result<Vec<FoodItem>, LookupError>) -> Self {
        self.table.insert(query.to_string(), answer);
        self
    }
}

#[async_trait]
impl FoodLookup for StubLookup {
    async fn fetch_candidates(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
        self.table
            .get(query)
            .cloned()
            .unwrap_or_else(|| Err(LookupError::Network(format!("no route for {query}"))))
    }
}

pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub selection: Arc<MemorySelectionStore>,
    pub sink: Arc<RecordingSink>,
    pub ctx: SessionContext,
}

pub fn harness(lookup: StubLookup) -> Harness {
    let store = Arc::new(FlakyStore::new());
    let selection = Arc::new(MemorySelectionStore::new());
    let sink = Arc::new(RecordingSink::new());
    let ctx = SessionContext {
        store: store.clone(),
        lookup: Arc::new(lookup),
        selection_store: selection.clone(),
        sink: sink.clone(),
    };
    Harness {
        store,
        selection,
        sink,
        ctx,
    }
}
