//! Runs the expiry check whenever the fridge changes.

use chrono::NaiveDateTime;

use crate::expiry::classify;
use crate::models::FoodItemWithDate;
use crate::notify::{Notification, NotificationDispatcher};
use crate::sync::Subscription;

/// Classifies fridge snapshots and dispatches a notification per expiring
/// item.
#[derive(Clone)]
pub struct ExpiryMonitor {
    dispatcher: NotificationDispatcher,
}

impl ExpiryMonitor {
    pub fn new(dispatcher: NotificationDispatcher) -> Self {
        Self { dispatcher }
    }

    /// One check of `items` against `reference`. Returns what was posted.
    pub fn check(&self, items: &[FoodItemWithDate], reference: NaiveDateTime) -> Vec<Notification> {
        let expiring = classify(items, reference);
        if expiring.is_empty() {
            tracing::debug!("No expiring items among {}", items.len());
            return Vec::new();
        }
        tracing::info!("{} of {} item(s) expiring", expiring.len(), items.len());
        self.dispatcher.dispatch(&expiring)
    }

    /// Checks every snapshot the subscription emits, reading the reference
    /// time from `clock` each time. Returns the number of notifications
    /// posted once the subscription ends.
    pub async fn run<F>(&self, mut subscription: Subscription, mut clock: F) -> usize
    where
        F: FnMut() -> NaiveDateTime,
    {
        let mut posted = 0;
        while let Some(items) = subscription.next_snapshot().await {
            posted += self.check(&items, clock()).len();
        }
        posted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FoodItem;
    use crate::notify::RecordingSink;
    use crate::sync::{CollectionPath, InMemoryStore, RemoteCollectionSync, RemoteStore};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::time::Duration;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn item(name: &str, date: &str) -> FoodItemWithDate {
        FoodItemWithDate::new(FoodItem::new(name, "Dairy", 60, 3), date)
    }

    #[test]
    fn test_check_dispatches_only_expiring() {
        let sink = Arc::new(RecordingSink::new());
        let monitor = ExpiryMonitor::new(NotificationDispatcher::new(sink.clone()));

        let items = vec![
            item("Milk", "01/01/2024"),
            item("Cheese", "10/01/2024"),
            item("Mystery", "not a date"),
        ];
        let posted = monitor.check(&items, reference());

        assert_eq!(posted.len(), 1);
        assert_eq!(sink.sent()[0].body, "Item Milk is going to expire today.");
    }

    #[test]
    fn test_check_nothing_expiring_posts_nothing() {
        let sink = Arc::new(RecordingSink::new());
        let monitor = ExpiryMonitor::new(NotificationDispatcher::new(sink.clone()));
        assert!(monitor.check(&[item("Cheese", "10/01/2024")], reference()).is_empty());
        assert!(sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_run_checks_each_snapshot() {
        let store = Arc::new(InMemoryStore::new());
        store.push_child("Fridge", &item("Milk", "01/01/2024")).await.unwrap();
        let sync = RemoteCollectionSync::new(store.clone());

        let sink = Arc::new(RecordingSink::new());
        let monitor = ExpiryMonitor::new(NotificationDispatcher::new(sink.clone()));
        let subscription = sync.subscribe(CollectionPath::Fridge);
        let handle = tokio::spawn(async move { monitor.run(subscription, reference).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.sent().len(), 1);

        // The same item fires again on the next snapshot.
        store.push_child("Fridge", &item("Cheese", "10/01/2024")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sink.sent().len(), 2);

        handle.abort();
    }
}
