//! Fridge Core Library
//!
//! Food models, remote collection sync, expiry classification, notification
//! dispatch and food search for the Fridge tracker.

pub mod expiry;
pub mod lookup;
pub mod models;
pub mod monitor;
pub mod notify;
pub mod search;
pub mod selection;
pub mod session;
pub mod storage;
pub mod sync;

pub use expiry::{classify, is_expiring};
pub use lookup::{parse_candidates, EdamamClient, FoodLookup, LookupError};
pub use models::{FoodItem, FoodItemWithDate, EXPIRY_DATE_FORMAT};
pub use monitor::ExpiryMonitor;
pub use notify::{
    expiry_channel, Importance, Notification, NotificationChannel, NotificationDispatcher,
    NotificationSink, RecordingSink, TracingSink, EXPIRY_CHANNEL_ID, EXPIRY_TITLE,
};
pub use search::{visible_candidates, SearchEngine, SearchOutcome, SearchSnapshot};
pub use selection::SelectionList;
pub use session::{FridgeSession, SessionContext, SessionError};
pub use storage::{FileSelectionStore, MemorySelectionStore, SelectionStore, SelectionStoreError};
pub use sync::{
    ChangeStream, CollectionPath, FirebaseStore, InMemoryStore, RemoteCollectionSync, RemoteStore,
    ReplaceReport, StoreError, Subscription,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
