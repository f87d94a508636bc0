//! Nutrition database lookup.
//!
//! [`FoodLookup`] is the seam between the search engine and the HTTP API;
//! [`EdamamClient`] is the production implementation.

mod edamam;

use async_trait::async_trait;

use crate::models::FoodItem;

pub use edamam::{parse_candidates, EdamamClient, DEFAULT_BASE_URL};

/// Why a lookup produced no candidates.
///
/// "No matches" is not an error: it is an `Ok` with an empty list.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),
    /// The service answered with a non-success status.
    #[error("food database returned status {0}")]
    Status(u16),
    /// The body was not JSON or lacked an expected field.
    #[error("failed to parse food database response: {0}")]
    Parse(String),
}

impl LookupError {
    /// True for transport failures and non-success statuses.
    pub fn is_network(&self) -> bool {
        matches!(self, LookupError::Network(_) | LookupError::Status(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, LookupError::Parse(_))
    }
}

/// Fetches food candidates for a free-text query.
#[async_trait]
pub trait FoodLookup: Send + Sync {
    async fn fetch_candidates(&self, query: &str) -> Result<Vec<FoodItem>, LookupError>;
}
