//! A session owns the fridge and grocery list mirrors, the selection list
//! and the search state for one user, built from an explicit
//! [`SessionContext`]. Closing or dropping the session detaches its remote
//! listeners.

use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::expiry::classify;
use crate::lookup::FoodLookup;
use crate::models::{FoodItem, FoodItemWithDate};
use crate::monitor::ExpiryMonitor;
use crate::notify::{Notification, NotificationDispatcher, NotificationSink};
use crate::search::SearchEngine;
use crate::selection::SelectionList;
use crate::storage::{SelectionStore, SelectionStoreError};
use crate::sync::{CollectionPath, RemoteCollectionSync, RemoteStore, ReplaceReport, StoreError, Subscription};

/// The external collaborators a session talks to.
#[derive(Clone)]
pub struct SessionContext {
    pub store: Arc<dyn RemoteStore>,
    pub lookup: Arc<dyn FoodLookup>,
    pub selection_store: Arc<dyn SelectionStore>,
    pub sink: Arc<dyn NotificationSink>,
}

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Selection(#[from] SelectionStoreError),
}

/// One user's view of the fridge, grocery list, selection and search.
pub struct FridgeSession {
    sync: RemoteCollectionSync,
    selection: SelectionList,
    search: SearchEngine,
    monitor: ExpiryMonitor,
    listeners: Vec<Subscription>,
}

impl FridgeSession {
    /// Opens a session with live listeners on both collections.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn open(ctx: SessionContext) -> Self {
        let mut session = Self::open_detached(ctx).await;
        session.listeners = CollectionPath::ALL
            .iter()
            .map(|path| session.sync.subscribe(*path))
            .collect();
        session
    }

    /// Opens a session without remote listeners. Local mirrors only change
    /// through this session's own writes and explicit
    /// [`RemoteCollectionSync::fetch`] calls.
    pub async fn open_detached(ctx: SessionContext) -> Self {
        let selection = match SelectionList::load(Arc::clone(&ctx.selection_store)).await {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!("Starting with an empty selection list: {}", e);
                SelectionList::empty(ctx.selection_store)
            }
        };

        Self {
            sync: RemoteCollectionSync::new(ctx.store),
            selection,
            search: SearchEngine::new(ctx.lookup),
            monitor: ExpiryMonitor::new(NotificationDispatcher::new(ctx.sink)),
            listeners: Vec::new(),
        }
    }

    pub fn sync(&self) -> &RemoteCollectionSync {
        &self.sync
    }

    pub fn search(&self) -> &SearchEngine {
        &self.search
    }

    pub fn monitor(&self) -> &ExpiryMonitor {
        &self.monitor
    }

    pub fn fridge(&self) -> Vec<FoodItemWithDate> {
        self.sync.snapshot(CollectionPath::Fridge)
    }

    pub fn grocery_list(&self) -> Vec<FoodItemWithDate> {
        self.sync.snapshot(CollectionPath::GroceryList)
    }

    pub fn selection(&self) -> &[FoodItem] {
        self.selection.items()
    }

    /// Adds a search result to the selection list.
    pub async fn select(&mut self, item: FoodItem) -> Result<(), SessionError> {
        Ok(self.selection.select(item).await?)
    }

    /// Removes the first matching entry from the selection list.
    pub async fn deselect(&mut self, item: &FoodItem) -> Result<bool, SessionError> {
        Ok(self.selection.deselect(item).await?)
    }

    /// Adds a dated item to the local grocery list. Nothing is written
    /// remotely until [`save_grocery_list`](Self::save_grocery_list).
    pub fn stage_for_list(&self, food: FoodItem, expiry_date: impl Into<String>) {
        let item = FoodItemWithDate::new(food, expiry_date);
        self.sync.merge_local(CollectionPath::GroceryList, [item]);
    }

    /// Publishes the local grocery list.
    pub async fn save_grocery_list(&self) -> Result<ReplaceReport, SessionError> {
        let items = self.grocery_list();
        Ok(self.sync.replace_all(CollectionPath::GroceryList, items).await?)
    }

    /// Moves the grocery list into the fridge: the fridge becomes
    /// fridge + grocery list and is published. The grocery list is kept.
    pub async fn checkout(&self) -> Result<ReplaceReport, SessionError> {
        let mut fridge = self.fridge();
        fridge.extend(self.grocery_list());
        tracing::info!("Checking out into fridge ({} item(s))", fridge.len());
        Ok(self.sync.replace_all(CollectionPath::Fridge, fridge).await?)
    }

    /// Removes the first fridge entry equal to `item` and publishes the
    /// fridge. Returns `None` when no entry matched.
    pub async fn remove_from_fridge(
        &self,
        item: &FoodItemWithDate,
    ) -> Result<Option<ReplaceReport>, SessionError> {
        let mut fridge = self.fridge();
        let Some(index) = fridge.iter().position(|i| i == item) else {
            tracing::warn!("Item not found in fridge: {}", item.food_item.name);
            return Ok(None);
        };
        fridge.remove(index);
        Ok(Some(self.sync.replace_all(CollectionPath::Fridge, fridge).await?))
    }

    /// Removes the first grocery-list entry for `food` and publishes the
    /// list. Returns `None` when no entry matched.
    pub async fn remove_from_grocery_list(
        &self,
        food: &FoodItem,
    ) -> Result<Option<ReplaceReport>, SessionError> {
        let mut list = self.grocery_list();
        let Some(index) = list.iter().position(|i| &i.food_item == food) else {
            tracing::warn!("Item not found in grocery list: {}", food.name);
            return Ok(None);
        };
        list.remove(index);
        Ok(Some(
            self.sync
                .replace_all(CollectionPath::GroceryList, list)
                .await?,
        ))
    }

    /// Empties the grocery list (locally and remotely) and the selection list.
    ///
    /// Both local lists are cleared even when the remote write fails. A store
    /// error is reported ahead of a selection persistence error.
    pub async fn empty_grocery_list(&mut self) -> Result<ReplaceReport, SessionError> {
        let cleared = self.selection.clear().await;
        let report = self
            .sync
            .replace_all(CollectionPath::GroceryList, Vec::new())
            .await?;
        cleared?;
        Ok(report)
    }

    /// Fridge items expiring relative to `reference`.
    pub fn expiring(&self, reference: NaiveDateTime) -> Vec<FoodItemWithDate> {
        classify(&self.fridge(), reference)
    }

    /// Checks the fridge against `reference` and posts the notifications.
    pub fn notify_expiring(&self, reference: NaiveDateTime) -> Vec<Notification> {
        self.monitor.check(&self.fridge(), reference)
    }

    /// Number of attached remote listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.iter().filter(|l| l.is_active()).count()
    }

    /// Detaches all listeners and ends the session.
    pub fn close(mut self) {
        for listener in self.listeners.drain(..) {
            listener.cancel();
        }
    }
}
