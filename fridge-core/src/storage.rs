//! Local persistence of the selection list.
//!
//! The selection list is a single blob: the whole ordered list is written on
//! every change and read once when a session opens.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::models::FoodItem;

/// File name of the selection list inside the data directory.
pub const SELECTION_FILE: &str = "selection.json";

/// Errors from loading or saving the selection list.
#[derive(Debug, thiserror::Error)]
pub enum SelectionStoreError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),
    #[error("failed to decode selection list {}: {1}", .0.display())]
    Decode(PathBuf, #[source] serde_json::Error),
    #[error("failed to encode selection list: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Key-value blob holding the ordered selection list.
#[async_trait]
pub trait SelectionStore: Send + Sync {
    /// Loads the stored list. A store that was never written loads as empty.
    async fn load(&self) -> Result<Vec<FoodItem>, SelectionStoreError>;

    /// Overwrites the stored list.
    async fn save(&self, items: &[FoodItem]) -> Result<(), SelectionStoreError>;
}

/// Selection list stored as JSON in the data directory.
#[derive(Debug, Clone)]
pub struct FileSelectionStore {
    path: PathBuf,
}

impl FileSelectionStore {
    /// Stores the list as [`SELECTION_FILE`] under `data_dir`.
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(SELECTION_FILE),
        }
    }

    /// Returns the full path of the blob.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SelectionStore for FileSelectionStore {
    async fn load(&self) -> Result<Vec<FoodItem>, SelectionStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| SelectionStoreError::Decode(self.path.clone(), e)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(SelectionStoreError::Io(self.path.clone(), e)),
        }
    }

    async fn save(&self, items: &[FoodItem]) -> Result<(), SelectionStoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| SelectionStoreError::Io(parent.to_path_buf(), e))?;
        }

        let bytes = serde_json::to_vec_pretty(items).map_err(SelectionStoreError::Encode)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| SelectionStoreError::Io(self.path.clone(), e))
    }
}

/// In-memory selection store for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemorySelectionStore {
    items: Mutex<Vec<FoodItem>>,
    saves: Mutex<usize>,
}

impl MemorySelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `items`.
    pub fn with_items(items: Vec<FoodItem>) -> Self {
        Self {
            items: Mutex::new(items),
            saves: Mutex::new(0),
        }
    }

    /// Number of times [`SelectionStore::save`] was called.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current stored contents.
    pub fn stored(&self) -> Vec<FoodItem> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SelectionStore for MemorySelectionStore {
    async fn load(&self) -> Result<Vec<FoodItem>, SelectionStoreError> {
        Ok(self.stored())
    }

    async fn save(&self, items: &[FoodItem]) -> Result<(), SelectionStoreError> {
        *self.items.lock().unwrap_or_else(PoisonError::into_inner) = items.to_vec();
        *self.saves.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        Ok(())
    }
}
