//! In-memory [`RemoteStore`] for tests and offline runs.
//!
//! Each path holds its children in insertion order under generated UUID
//! keys. Every write publishes a tick on the path's broadcast channel, which
//! is what [`RemoteStore::changes`] streams.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::error::StoreError;
use super::store::{ChangeStream, RemoteStore};
use crate::models::FoodItemWithDate;

const CHANNEL_CAPACITY: usize = 64;

/// In-memory document store.
#[derive(Default)]
pub struct InMemoryStore {
    collections: RwLock<HashMap<String, Vec<(String, FoodItemWithDate)>>>,
    channels: Mutex<HashMap<String, broadcast::Sender<()>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys currently stored under `path`, in insertion order.
    pub fn keys(&self, path: &str) -> Vec<String> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|children| children.iter().map(|(key, _)| key.clone()).collect())
            .unwrap_or_default()
    }

    fn sender(&self, path: &str) -> broadcast::Sender<()> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(path.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    fn publish(&self, path: &str) {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(sender) = channels.get(path) {
            // No receivers is fine.
            let _ = sender.send(());
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn read_children(&self, path: &str) -> Result<Vec<FoodItemWithDate>, StoreError> {
        Ok(self
            .collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map(|children| children.iter().map(|(_, item)| item.clone()).collect())
            .unwrap_or_default())
    }

    async fn delete_all(&self, path: &str) -> Result<(), StoreError> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path);
        self.publish(path);
        Ok(())
    }

    async fn push_child(&self, path: &str, item: &FoodItemWithDate) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(path.to_string())
            .or_default()
            .push((key.clone(), item.clone()));
        self.publish(path);
        Ok(key)
    }

    async fn changes(&self, path: &str) -> Result<ChangeStream, StoreError> {
        let receiver = self.sender(path).subscribe();
        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            match receiver.recv().await {
                // A lagged receiver still only needs one re-read.
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => Some((Ok(()), receiver)),
                Err(broadcast::error::RecvError::Closed) => None,
            }
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodItem;
    use futures::StreamExt;
    use std::time::Duration;

    fn item(name: &str) -> FoodItemWithDate {
        FoodItemWithDate::new(FoodItem::new(name, "Dairy", 60, 3), "01/01/2024")
    }

    #[tokio::test]
    async fn test_unwritten_path_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.read_children("Fridge").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_and_read() {
        let store = InMemoryStore::new();
        let key_a = store.push_child("Fridge", &item("A")).await.unwrap();
        let key_b = store.push_child("Fridge", &item("B")).await.unwrap();

        assert_ne!(key_a, key_b);
        assert_eq!(store.keys("Fridge"), vec![key_a, key_b]);
        assert_eq!(
            store.read_children("Fridge").await.unwrap(),
            vec![item("A"), item("B")]
        );
    }

    #[tokio::test]
    async fn test_paths_are_independent() {
        let store = InMemoryStore::new();
        store.push_child("Fridge", &item("A")).await.unwrap();
        store.push_child("Grocery List", &item("B")).await.unwrap();
        store.delete_all("Grocery List").await.unwrap();

        assert_eq!(store.read_children("Fridge").await.unwrap().len(), 1);
        assert!(store.read_children("Grocery List").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_tick_on_writes() {
        let store = InMemoryStore::new();
        let mut changes = store.changes("Fridge").await.unwrap();

        store.push_child("Fridge", &item("A")).await.unwrap();
        store.delete_all("Fridge").await.unwrap();

        for _ in 0..2 {
            let tick = tokio::time::timeout(Duration::from_secs(1), changes.next())
                .await
                .unwrap();
            assert_eq!(tick, Some(Ok(())));
        }
    }

    #[tokio::test]
    async fn test_changes_ignore_other_paths() {
        let store = InMemoryStore::new();
        let mut changes = store.changes("Fridge").await.unwrap();

        store.push_child("Grocery List", &item("A")).await.unwrap();

        let tick = tokio::time::timeout(Duration::from_millis(50), changes.next()).await;
        assert!(tick.is_err());
    }
}
