//! Remote collection sync.
//!
//! The fridge and the grocery list live in a remote document store as flat
//! sets of records under the paths `"Fridge"` and `"Grocery List"`.
//!
//! - [`RemoteStore`]: the store seam (read, delete-all, push, change feed)
//! - [`InMemoryStore`]: process-local store with broadcast change feeds
//! - [`FirebaseStore`]: Firebase Realtime Database over REST and SSE
//! - [`RemoteCollectionSync`]: local mirrors, live subscriptions, full replace

mod collection;
mod error;
mod firebase;
mod memory;
mod store;

pub use collection::{RemoteCollectionSync, ReplaceReport, Subscription};
pub use error::StoreError;
pub use firebase::FirebaseStore;
pub use memory::InMemoryStore;
pub use store::{ChangeStream, CollectionPath, RemoteStore};
