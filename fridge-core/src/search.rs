//! Reactive food search.
//!
//! Setting the query starts a lookup for it. Only the latest query counts:
//! starting a new lookup aborts the one in flight, and a result that still
//! slips through for an older query is discarded. State is published
//! through a `watch` channel so observers see every transition
//! `Idle -> Fetching -> (Found | Empty | Failed)`.
//!
//! The outcome is not reset to `Idle` once a lookup completes. It keeps the
//! last result, so callers can tell "no matches" from "lookup failed" after
//! the fact; `is_fetching` is false in every settled state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::lookup::{FoodLookup, LookupError};
use crate::models::FoodItem;

/// Result of the latest lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SearchOutcome {
    /// No lookup has run yet.
    #[default]
    Idle,
    Fetching,
    /// The lookup returned this many candidates.
    Found(usize),
    /// The lookup succeeded with no candidates.
    Empty,
    Failed(LookupError),
}

/// Published search state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
    pub query: String,
    /// Candidates from the latest completed lookup, unfiltered.
    pub candidates: Vec<FoodItem>,
    pub outcome: SearchOutcome,
}

impl SearchSnapshot {
    pub fn is_fetching(&self) -> bool {
        self.outcome == SearchOutcome::Fetching
    }

    /// Candidates whose name matches the current query.
    pub fn visible(&self) -> Vec<FoodItem> {
        visible_candidates(&self.candidates, &self.query)
    }
}

/// Filters `candidates` by case-insensitive name match. A blank query shows
/// everything.
pub fn visible_candidates(candidates: &[FoodItem], query: &str) -> Vec<FoodItem> {
    if query.trim().is_empty() {
        return candidates.to_vec();
    }
    candidates
        .iter()
        .filter(|item| item.matches_query(query))
        .cloned()
        .collect()
}

/// Search state machine over a [`FoodLookup`].
pub struct SearchEngine {
    lookup: Arc<dyn FoodLookup>,
    state: Arc<watch::Sender<SearchSnapshot>>,
    generation: Arc<AtomicU64>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl SearchEngine {
    pub fn new(lookup: Arc<dyn FoodLookup>) -> Self {
        Self {
            lookup,
            state: Arc::new(watch::channel(SearchSnapshot::default()).0),
            generation: Arc::new(AtomicU64::new(0)),
            in_flight: Mutex::new(None),
        }
    }

    /// Sets the query and starts a lookup for it, cancelling any lookup
    /// still running. An empty query is looked up too.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn set_query(&self, text: impl Into<String>) {
        let query = text.into();

        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.query = query.clone();
            state.outcome = SearchOutcome::Fetching;
        });

        let lookup = Arc::clone(&self.lookup);
        let state = Arc::clone(&self.state);
        let current = Arc::clone(&self.generation);
        let task = tokio::spawn(async move {
            let result = lookup.fetch_candidates(&query).await;
            state.send_if_modified(|snapshot| {
                if current.load(Ordering::SeqCst) != generation {
                    tracing::debug!("Discarding stale results for {:?}", query);
                    return false;
                }
                match result {
                    Ok(items) => {
                        snapshot.outcome = if items.is_empty() {
                            SearchOutcome::Empty
                        } else {
                            SearchOutcome::Found(items.len())
                        };
                        snapshot.candidates = items;
                    }
                    Err(e) => {
                        tracing::warn!("Food lookup for {:?} failed: {}", query, e);
                        snapshot.candidates.clear();
                        snapshot.outcome = SearchOutcome::Failed(e);
                    }
                }
                true
            });
        });

        let previous = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Resets the query text without starting a lookup.
    pub fn clear_query(&self) {
        self.state.send_modify(|state| state.query.clear());
    }

    /// Runs a lookup directly, without touching the engine's state.
    pub async fn fetch_candidates(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
        self.lookup.fetch_candidates(query).await
    }

    pub fn query(&self) -> String {
        self.state.borrow().query.clone()
    }

    pub fn is_fetching(&self) -> bool {
        self.state.borrow().is_fetching()
    }

    pub fn outcome(&self) -> SearchOutcome {
        self.state.borrow().outcome.clone()
    }

    /// Candidates matching the current query.
    pub fn visible_candidates(&self) -> Vec<FoodItem> {
        self.state.borrow().visible()
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.state.borrow().clone()
    }

    /// Observes state transitions.
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.state.subscribe()
    }

    /// Waits until no lookup is running and returns the settled state.
    pub async fn settled(&self) -> SearchSnapshot {
        let mut receiver = self.state.subscribe();
        let settled = receiver
            .wait_for(|state| !state.is_fetching())
            .await
            .map(|state| (*state).clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        if let Some(task) = self
            .in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Lookup answering from a table, with an optional per-query delay.
    struct TableLookup {
        answers: HashMap<String, Result<Vec<FoodItem>, LookupError>>,
        delays: HashMap<String, Duration>,
    }

    #[async_trait]
    impl FoodLookup for TableLookup {
        async fn fetch_candidates(&self, query: &str) -> Result<Vec<FoodItem>, LookupError> {
            if let Some(delay) = self.delays.get(query) {
                tokio::time::sleep(*delay).await;
            }
            self.answers.get(query).cloned().unwrap_or(Ok(Vec::new()))
        }
    }

    fn apples() -> Vec<FoodItem> {
        vec![
            FoodItem::new("Apple", "Generic foods", 52, 0),
            FoodItem::new("Apple Pie", "Generic meals", 237, 1),
            FoodItem::new("Pineapple", "Generic foods", 50, 0),
        ]
    }

    fn engine(
        answers: Vec<(&str, Result<Vec<FoodItem>, LookupError>)>,
        delays: Vec<(&str, Duration)>,
    ) -> SearchEngine {
        SearchEngine::new(Arc::new(TableLookup {
            answers: answers
                .into_iter()
                .map(|(q, r)| (q.to_string(), r))
                .collect(),
            delays: delays.into_iter().map(|(q, d)| (q.to_string(), d)).collect(),
        }))
    }

    #[test]
    fn test_visible_candidates_filters_case_insensitively() {
        let visible = visible_candidates(&apples(), "APPLE");
        assert_eq!(visible.len(), 3);

        let visible = visible_candidates(&apples(), "pie");
        assert_eq!(visible, vec![FoodItem::new("Apple Pie", "Generic meals", 237, 1)]);
    }

    #[test]
    fn test_blank_query_shows_everything() {
        assert_eq!(visible_candidates(&apples(), "").len(), 3);
        assert_eq!(visible_candidates(&apples(), "   ").len(), 3);
    }

    #[tokio::test]
    async fn test_initial_state_is_idle() {
        let engine = engine(vec![], vec![]);
        assert_eq!(engine.outcome(), SearchOutcome::Idle);
        assert!(!engine.is_fetching());
        assert!(engine.visible_candidates().is_empty());
    }

    #[tokio::test]
    async fn test_set_query_fetches_and_settles() {
        let engine = engine(vec![("apple", Ok(apples()))], vec![]);
        engine.set_query("apple");
        assert!(engine.is_fetching());

        let state = engine.settled().await;
        assert_eq!(state.outcome, SearchOutcome::Found(3));
        assert_eq!(state.query, "apple");
        assert_eq!(engine.visible_candidates().len(), 3);
    }

    #[tokio::test]
    async fn test_no_matches_is_empty_not_failed() {
        let engine = engine(vec![("zzz", Ok(vec![]))], vec![]);
        engine.set_query("zzz");
        assert_eq!(engine.settled().await.outcome, SearchOutcome::Empty);
    }

    #[tokio::test]
    async fn test_failure_is_typed_and_clears_candidates() {
        let engine = engine(
            vec![
                ("apple", Ok(apples())),
                ("offline", Err(LookupError::Network("connection refused".into()))),
            ],
            vec![],
        );
        engine.set_query("apple");
        engine.settled().await;

        engine.set_query("offline");
        let state = engine.settled().await;
        assert_eq!(
            state.outcome,
            SearchOutcome::Failed(LookupError::Network("connection refused".into()))
        );
        assert!(state.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_later_query_wins_over_slow_earlier_one() {
        let engine = engine(
            vec![
                ("app", Ok(vec![FoodItem::new("Application", "Odd", 1, 1)])),
                ("apple", Ok(apples())),
            ],
            vec![("app", Duration::from_millis(200))],
        );

        engine.set_query("app");
        engine.set_query("apple");

        let state = engine.settled().await;
        assert_eq!(state.query, "apple");
        assert_eq!(state.outcome, SearchOutcome::Found(3));

        // The aborted lookup must not overwrite the result later.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(engine.snapshot().candidates, apples());
    }

    #[tokio::test]
    async fn test_clear_query_keeps_candidates_visible() {
        let engine = engine(vec![("pie", Ok(apples()))], vec![]);
        engine.set_query("pie");
        engine.settled().await;
        assert_eq!(engine.visible_candidates().len(), 1);

        engine.clear_query();
        assert_eq!(engine.query(), "");
        assert_eq!(engine.visible_candidates().len(), 3);
        assert!(!engine.is_fetching());
    }

    #[tokio::test]
    async fn test_fetch_candidates_leaves_state_alone() {
        let engine = engine(vec![("apple", Ok(apples()))], vec![]);
        let items = engine.fetch_candidates("apple").await.unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(engine.outcome(), SearchOutcome::Idle);
    }
}
