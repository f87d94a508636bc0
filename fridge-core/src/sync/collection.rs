//! Keeps in-memory lists in step with the remote fridge and grocery list.
//!
//! Each [`CollectionPath`] has one local mirror. Live subscriptions re-read
//! the whole path on every remote change and replace the mirror; writes
//! replace the whole remote path (delete everything, then push every item).

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::error::StoreError;
use super::store::{CollectionPath, RemoteStore};
use crate::models::FoodItemWithDate;

type Mirror = Arc<watch::Sender<Vec<FoodItemWithDate>>>;

/// Outcome of a [`RemoteCollectionSync::replace_all`] whose delete step
/// succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceReport {
    /// Items pushed successfully.
    pub written: usize,
    /// Items whose push failed. They are not retried and nothing is rolled
    /// back, so the remote path is missing exactly these items.
    pub failed: Vec<(FoodItemWithDate, StoreError)>,
}

impl ReplaceReport {
    /// True when every item reached the store.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Bidirectional sync between local lists and the remote store.
pub struct RemoteCollectionSync {
    store: Arc<dyn RemoteStore>,
    fridge: Mirror,
    grocery_list: Mirror,
}

impl RemoteCollectionSync {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            fridge: Arc::new(watch::channel(Vec::new()).0),
            grocery_list: Arc::new(watch::channel(Vec::new()).0),
        }
    }

    fn mirror(&self, path: CollectionPath) -> &Mirror {
        match path {
            CollectionPath::Fridge => &self.fridge,
            CollectionPath::GroceryList => &self.grocery_list,
        }
    }

    /// Current local list for `path`.
    pub fn snapshot(&self, path: CollectionPath) -> Vec<FoodItemWithDate> {
        self.mirror(path).borrow().clone()
    }

    /// Observes the local list for `path`, including local-only changes.
    pub fn watch(&self, path: CollectionPath) -> watch::Receiver<Vec<FoodItemWithDate>> {
        self.mirror(path).subscribe()
    }

    /// Opens a live subscription to `path`.
    ///
    /// The first snapshot is emitted once the change feed is open and the
    /// initial read has finished; after that, one snapshot each time a remote
    /// change leaves the contents different from the last snapshot.
    /// Every snapshot also replaces the local mirror. The subscription runs
    /// until it is cancelled or dropped, or until the store closes the feed.
    /// It is never re-opened behind the caller's back.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, path: CollectionPath) -> Subscription {
        let (sender, receiver) = watch::channel(Vec::new());
        let task = tokio::spawn(listen(
            Arc::clone(&self.store),
            path,
            Arc::clone(self.mirror(path)),
            sender,
        ));
        tracing::debug!("Subscribed to {}", path);
        Subscription {
            path,
            snapshots: receiver,
            task,
        }
    }

    /// Reads `path` once, replaces the local mirror and returns the items.
    pub async fn fetch(&self, path: CollectionPath) -> Result<Vec<FoodItemWithDate>, StoreError> {
        let items = self.store.read_children(path.as_str()).await?;
        self.mirror(path).send_replace(items.clone());
        Ok(items)
    }

    /// Replaces the contents of `path` with `items`, locally and remotely.
    ///
    /// The local mirror is updated first. Remotely every child is deleted and
    /// then each item is pushed. A failed delete returns the error and pushes
    /// nothing. Failed pushes are logged and reported in the
    /// [`ReplaceReport`]; the others still go through.
    ///
    /// Concurrent replaces of the same path are not ordered: the remote path
    /// ends up with whatever the last requests to land leave behind, and a
    /// reader may see it empty between the delete and the pushes.
    pub async fn replace_all(
        &self,
        path: CollectionPath,
        items: Vec<FoodItemWithDate>,
    ) -> Result<ReplaceReport, StoreError> {
        self.mirror(path).send_replace(items.clone());

        let name = path.as_str();
        if let Err(e) = self.store.delete_all(name).await {
            tracing::error!("Failed to clear {}: {}", name, e);
            return Err(e);
        }

        let store = &self.store;
        let pushes = items
            .iter()
            .map(|item| async move { (item, store.push_child(name, item).await) });

        let mut report = ReplaceReport::default();
        for (item, result) in futures::future::join_all(pushes).await {
            match result {
                Ok(key) => {
                    tracing::debug!("Item {} added to {} as {}", item.food_item.name, name, key);
                    report.written += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to add item {} to {}: {}", item.food_item.name, name, e);
                    report.failed.push((item.clone(), e));
                }
            }
        }
        Ok(report)
    }

    /// Appends `items` to the local list for `path` without touching the
    /// remote store. A later [`replace_all`](Self::replace_all) publishes them.
    pub fn merge_local(&self, path: CollectionPath, items: impl IntoIterator<Item = FoodItemWithDate>) {
        self.mirror(path).send_modify(|list| list.extend(items));
    }
}

async fn listen(
    store: Arc<dyn RemoteStore>,
    path: CollectionPath,
    mirror: Mirror,
    sender: watch::Sender<Vec<FoodItemWithDate>>,
) {
    let mut changes = match store.changes(path.as_str()).await {
        Ok(changes) => changes,
        Err(e) => {
            tracing::error!("Failed to subscribe to {}: {}", path, e);
            return;
        }
    };

    if !refresh(store.as_ref(), path, &mirror, &sender, true).await {
        return;
    }

    while let Some(change) = changes.next().await {
        match change {
            Ok(()) => {
                if !refresh(store.as_ref(), path, &mirror, &sender, false).await {
                    return;
                }
            }
            Err(e) => tracing::warn!("Change feed error on {}: {}", path, e),
        }
    }
    tracing::debug!("Change feed for {} closed", path);
}

/// Re-reads `path` and publishes the result. The initial read is always
/// published; later reads only when the contents differ. Returns false once
/// nobody is listening any more.
async fn refresh(
    store: &dyn RemoteStore,
    path: CollectionPath,
    mirror: &watch::Sender<Vec<FoodItemWithDate>>,
    sender: &watch::Sender<Vec<FoodItemWithDate>>,
    initial: bool,
) -> bool {
    match store.read_children(path.as_str()).await {
        Ok(items) => {
            if initial {
                mirror.send_replace(items.clone());
                sender.send_replace(items);
            } else {
                publish_if_changed(mirror, &items);
                if !publish_if_changed(sender, &items) {
                    tracing::debug!("{} unchanged", path);
                }
            }
            !sender.is_closed()
        }
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path, e);
            true
        }
    }
}

fn publish_if_changed(
    sender: &watch::Sender<Vec<FoodItemWithDate>>,
    items: &[FoodItemWithDate],
) -> bool {
    sender.send_if_modified(|current| {
        if current.as_slice() == items {
            return false;
        }
        *current = items.to_vec();
        true
    })
}

/// Handle to a live subscription.
///
/// Snapshots are full lists. A consumer that falls behind receives the most
/// recent snapshot rather than every intermediate one. Dropping the handle
/// detaches the listener.
pub struct Subscription {
    path: CollectionPath,
    snapshots: watch::Receiver<Vec<FoodItemWithDate>>,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn path(&self) -> CollectionPath {
        self.path
    }

    /// Waits for the next snapshot. `None` once the subscription has ended.
    pub async fn next_snapshot(&mut self) -> Option<Vec<FoodItemWithDate>> {
        self.snapshots.changed().await.ok()?;
        Some(self.snapshots.borrow_and_update().clone())
    }

    /// Whether the listener is still attached.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Detaches the listener.
    pub fn cancel(self) {
        tracing::debug!("Unsubscribed from {}", self.path);
    }

    /// Turns the subscription into a stream of snapshots.
    pub fn into_stream(self) -> impl Stream<Item = Vec<FoodItemWithDate>> + Send {
        futures::stream::unfold(self, |mut subscription| async move {
            let snapshot = subscription.next_snapshot().await?;
            Some((snapshot, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
