//! [`RemoteStore`] backed by the Firebase Realtime Database REST API.
//!
//! - `GET    <base>/<path>.json` returns `null` or an object of key -> record
//! - `DELETE <base>/<path>.json` removes the whole path
//! - `POST   <base>/<path>.json` adds a child and answers `{"name": "<key>"}`
//! - `GET` with `Accept: text/event-stream` streams server-sent events;
//!   `put` and `patch` events mean the path changed.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::Value;

use super::error::StoreError;
use super::store::{ChangeStream, RemoteStore};
use crate::models::FoodItemWithDate;

/// Firebase Realtime Database client.
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

impl FirebaseStore {
    /// Creates a store for the database at `base_url`
    /// (e.g. `https://<db>.firebasedatabase.app`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn path_url(&self, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}.json",
            self.base_url.trim_end_matches('/'),
            encoded.join("/")
        )
    }
}

#[async_trait]
impl RemoteStore for FirebaseStore {
    async fn read_children(&self, path: &str) -> Result<Vec<FoodItemWithDate>, StoreError> {
        let response = self
            .client
            .get(self.path_url(path))
            .send()
            .await
            .map_err(|e| StoreError::read(path, e))?;

        if !response.status().is_success() {
            return Err(StoreError::read(
                path,
                format!("server returned status {}", response.status()),
            ));
        }

        let children: Option<HashMap<String, Value>> = response
            .json()
            .await
            .map_err(|e| StoreError::read(path, e))?;

        Ok(decode_children(path, children.unwrap_or_default()))
    }

    async fn delete_all(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.path_url(path))
            .send()
            .await
            .map_err(|e| StoreError::write(path, e))?;

        if !response.status().is_success() {
            return Err(StoreError::write(
                path,
                format!("server returned status {}", response.status()),
            ));
        }
        Ok(())
    }

    async fn push_child(&self, path: &str, item: &FoodItemWithDate) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.path_url(path))
            .json(item)
            .send()
            .await
            .map_err(|e| StoreError::write(path, e))?;

        if !response.status().is_success() {
            return Err(StoreError::write(
                path,
                format!("server returned status {}", response.status()),
            ));
        }

        let pushed: PushResponse = response
            .json()
            .await
            .map_err(|e| StoreError::write(path, e))?;
        Ok(pushed.name)
    }

    async fn changes(&self, path: &str) -> Result<ChangeStream, StoreError> {
        let response = self
            .client
            .get(self.path_url(path))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| StoreError::read(path, e))?;

        if !response.status().is_success() {
            return Err(StoreError::read(
                path,
                format!("server returned status {}", response.status()),
            ));
        }

        Ok(change_stream(
            path.to_string(),
            Box::pin(response.bytes_stream()),
        ))
    }
}

/// Decodes children, skipping any that do not have the record shape.
fn decode_children(path: &str, children: HashMap<String, Value>) -> Vec<FoodItemWithDate> {
    children
        .into_iter()
        .filter_map(
            |(key, value)| match serde_json::from_value::<FoodItemWithDate>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!("Skipping malformed record {}/{}: {}", path, key, e);
                    None
                }
            },
        )
        .collect()
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerEvent {
    name: String,
    data: String,
}

/// Incremental `text/event-stream` parser. Chunks may split lines anywhere.
#[derive(Debug, Default)]
struct EventParser {
    buffer: Vec<u8>,
    name: Option<String>,
    data: Vec<String>,
}

impl EventParser {
    fn feed(&mut self, chunk: &[u8]) -> Vec<ServerEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(['\n', '\r']);

            if line.is_empty() {
                if let Some(event) = self.take_event() {
                    events.push(event);
                }
                continue;
            }
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.name = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }
        events
    }

    fn take_event(&mut self) -> Option<ServerEvent> {
        if self.name.is_none() && self.data.is_empty() {
            return None;
        }
        let name = self.name.take().unwrap_or_else(|| "message".to_string());
        let data = std::mem::take(&mut self.data).join("\n");
        Some(ServerEvent { name, data })
    }
}

/// Maps an event to a change tick. `None` means the event carries no change.
fn interpret_event(path: &str, event: &ServerEvent) -> Option<Result<(), StoreError>> {
    match event.name.as_str() {
        "put" | "patch" => Some(Ok(())),
        "keep-alive" => None,
        "cancel" => Some(Err(StoreError::read(
            path,
            format!("listener cancelled: {}", event.data),
        ))),
        "auth_revoked" => Some(Err(StoreError::read(path, "credential revoked"))),
        other => {
            tracing::debug!("Ignoring event {:?} on {}", other, path);
            None
        }
    }
}

struct EventFeed<S> {
    path: String,
    body: S,
    parser: EventParser,
    pending: VecDeque<Result<(), StoreError>>,
}

fn change_stream<S, B>(path: String, body: S) -> ChangeStream
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let feed = EventFeed {
        path,
        body,
        parser: EventParser::default(),
        pending: VecDeque::new(),
    };

    Box::pin(futures::stream::unfold(feed, |mut feed| async move {
        loop {
            if let Some(next) = feed.pending.pop_front() {
                return Some((next, feed));
            }
            match feed.body.next().await {
                Some(Ok(chunk)) => {
                    for event in feed.parser.feed(chunk.as_ref()) {
                        if let Some(tick) = interpret_event(&feed.path, &event) {
                            feed.pending.push_back(tick);
                        }
                    }
                }
                Some(Err(e)) => {
                    let err = StoreError::read(&feed.path, e);
                    return Some((Err(err), feed));
                }
                None => return None,
            }
        }
    }))
}
