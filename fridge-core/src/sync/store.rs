//! The remote document store seam.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::error::StoreError;
use crate::models::FoodItemWithDate;

/// Stream of change ticks for one path. Each `Ok(())` means "the contents
/// may have changed, read again".
pub type ChangeStream = Pin<Box<dyn Stream<Item = Result<(), StoreError>> + Send>>;

/// The two collections kept in the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionPath {
    Fridge,
    GroceryList,
}

impl CollectionPath {
    pub const ALL: [CollectionPath; 2] = [CollectionPath::Fridge, CollectionPath::GroceryList];

    /// Path of the collection in the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionPath::Fridge => "Fridge",
            CollectionPath::GroceryList => "Grocery List",
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A network-backed store of unordered records addressed by path.
///
/// Child keys are generated by the store and never leave it.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads every child under `path`. A path that was never written is empty.
    async fn read_children(&self, path: &str) -> Result<Vec<FoodItemWithDate>, StoreError>;

    /// Deletes every child under `path`.
    async fn delete_all(&self, path: &str) -> Result<(), StoreError>;

    /// Adds `item` as a new child and returns its generated key.
    async fn push_child(&self, path: &str, item: &FoodItemWithDate) -> Result<String, StoreError>;

    /// Opens a live change feed for `path`. The feed is established when this
    /// returns, so a read issued afterwards cannot miss a change.
    async fn changes(&self, path: &str) -> Result<ChangeStream, StoreError>;
}
