mod check;
mod config_cmd;
mod list;
mod search;
mod watch;

pub use check::CheckCommand;
pub use config_cmd::ConfigCommand;
pub use list::ListCommand;
pub use search::SearchCommand;
pub use watch::WatchCommand;

use std::sync::Arc;

use fridge_core::{
    EdamamClient, FileSelectionStore, FirebaseStore, InMemoryStore, LookupError, RemoteStore,
    SessionContext, StoreError, TracingSink,
};

use crate::config::Config;

/// Builds the collaborators for a session from the configuration.
///
/// `offline` swaps the remote database for an empty in-memory one.
pub fn session_context(config: &Config, offline: bool) -> Result<SessionContext, CommandError> {
    let store: Arc<dyn RemoteStore> = if offline {
        tracing::info!("Running offline with an in-memory store");
        Arc::new(InMemoryStore::new())
    } else {
        let url = config
            .database_url
            .value
            .as_deref()
            .ok_or(CommandError::NotConfigured("database_url"))?;
        Arc::new(FirebaseStore::new(url))
    };

    let api = &config.food_api;
    let lookup = EdamamClient::with_base_url(
        &api.base_url,
        api.app_id.as_deref().unwrap_or_default(),
        api.app_key.as_deref().unwrap_or_default(),
    );

    Ok(SessionContext {
        store,
        lookup: Arc::new(lookup),
        selection_store: Arc::new(FileSelectionStore::new(&config.data_dir.value)),
        sink: Arc::new(TracingSink),
    })
}

#[derive(Debug)]
pub enum CommandError {
    NotConfigured(&'static str),
    InvalidTime(String),
    Store(StoreError),
    Lookup(LookupError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::NotConfigured(key) => write!(
                f,
                "'{}' is not configured (set it in the config file or environment, or use --offline)",
                key
            ),
            CommandError::InvalidTime(s) => write!(
                f,
                "Invalid time '{}': expected RFC 3339 or YYYY-MM-DD",
                s
            ),
            CommandError::Store(e) => write!(f, "{}", e),
            CommandError::Lookup(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Store(e) => Some(e),
            CommandError::Lookup(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Store(e)
    }
}

impl From<LookupError> for CommandError {
    fn from(e: LookupError) -> Self {
        CommandError::Lookup(e)
    }
}
