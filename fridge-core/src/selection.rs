//! The selection list: food items picked from search results that have not
//! been given an expiry date yet.

use std::sync::Arc;

use crate::models::FoodItem;
use crate::storage::{SelectionStore, SelectionStoreError};

/// Ordered, persisted list of selected food items.
///
/// Duplicates are allowed. Every mutation is applied in memory first and
/// then the whole list is written to the store; when the write fails the
/// in-memory list keeps the change and the error is returned.
pub struct SelectionList {
    store: Arc<dyn SelectionStore>,
    items: Vec<FoodItem>,
}

impl SelectionList {
    /// Loads the list from `store`.
    pub async fn load(store: Arc<dyn SelectionStore>) -> Result<Self, SelectionStoreError> {
        let items = store.load().await?;
        Ok(Self { store, items })
    }

    /// Starts with an empty list without reading the store.
    pub fn empty(store: Arc<dyn SelectionStore>) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[FoodItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends `item`, even if an equal item is already selected.
    pub async fn select(&mut self, item: FoodItem) -> Result<(), SelectionStoreError> {
        self.items.push(item);
        self.persist().await
    }

    /// Removes the first item equal to `item`.
    ///
    /// Returns whether anything was removed. The list is persisted either way.
    pub async fn deselect(&mut self, item: &FoodItem) -> Result<bool, SelectionStoreError> {
        let removed = match self.items.iter().position(|i| i == item) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        };
        self.persist().await?;
        Ok(removed)
    }

    /// Removes everything.
    pub async fn clear(&mut self) -> Result<(), SelectionStoreError> {
        self.items.clear();
        self.persist().await
    }

    async fn persist(&self) -> Result<(), SelectionStoreError> {
        self.store.save(&self.items).await.map_err(|e| {
            tracing::error!("Failed to persist selection list: {}", e);
            e
        })
    }
}
