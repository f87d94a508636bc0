//! Expiry notifications.
//!
//! The [`NotificationDispatcher`] turns classified items into one
//! notification each and hands them to a [`NotificationSink`]. Every
//! notification gets a fresh random id, so repeated checks for the same item
//! stack up as separate notifications instead of replacing each other.
//! Delivery is fire-and-forget: sinks do not report failures back.

use std::sync::{Arc, Mutex, PoisonError};

use crate::models::FoodItemWithDate;

/// Channel every expiry notification is posted to.
pub const EXPIRY_CHANNEL_ID: &str = "expiry_reminder";

/// Title of every expiry notification.
pub const EXPIRY_TITLE: &str = "Expiry Notice";

/// Importance of a channel, or priority of a single notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Importance::Default => write!(f, "default"),
            Importance::High => write!(f, "high"),
        }
    }
}

/// A notification channel, registered with the sink before anything is posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

/// The channel used for expiry reminders.
pub fn expiry_channel() -> NotificationChannel {
    NotificationChannel {
        id: EXPIRY_CHANNEL_ID.to_string(),
        name: "Expiry Reminder".to_string(),
        description: "For when a food expires in the next day".to_string(),
        importance: Importance::High,
    }
}

/// A single notification handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel_id: String,
    pub id: i32,
    pub title: String,
    pub body: String,
    pub priority: Importance,
}

impl Notification {
    /// Builds the expiry notice for `item` with a random id.
    pub fn expiry_notice(item: &FoodItemWithDate) -> Self {
        Self {
            channel_id: EXPIRY_CHANNEL_ID.to_string(),
            id: rand::random::<i32>(),
            title: EXPIRY_TITLE.to_string(),
            body: format!("Item {} is going to expire today.", item.food_item.name),
            priority: Importance::High,
        }
    }
}

impl std::fmt::Display for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.id, self.title, self.body)
    }
}

/// Destination for notifications (the OS notification service, a log, ...).
pub trait NotificationSink: Send + Sync {
    /// Registers a channel. Registering the same id twice is allowed.
    fn register_channel(&self, channel: &NotificationChannel);

    /// Posts a notification.
    fn notify(&self, notification: &Notification);
}

/// Converts expiring items into notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    /// Creates a dispatcher and registers the expiry channel with `sink`.
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        sink.register_channel(&expiry_channel());
        Self { sink }
    }

    /// Posts one notification per item and returns what was posted.
    ///
    /// Does nothing for an empty slice.
    pub fn dispatch(&self, items: &[FoodItemWithDate]) -> Vec<Notification> {
        let mut sent = Vec::with_capacity(items.len());
        for item in items {
            let notification = Notification::expiry_notice(item);
            tracing::debug!(
                "Posting expiry notice {} for {}",
                notification.id,
                item.food_item.name
            );
            self.sink.notify(&notification);
            sent.push(notification);
        }
        sent
    }
}

/// Sink that writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn register_channel(&self, channel: &NotificationChannel) {
        tracing::debug!(
            "Registered channel {} ({}, importance {})",
            channel.id,
            channel.name,
            channel.importance
        );
    }

    fn notify(&self, notification: &Notification) {
        tracing::info!(
            channel = %notification.channel_id,
            id = notification.id,
            priority = %notification.priority,
            "{}: {}",
            notification.title,
            notification.body
        );
    }
}

/// Sink that keeps everything it receives in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    channels: Mutex<Vec<NotificationChannel>>,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered channels, one entry per distinct id.
    pub fn channels(&self) -> Vec<NotificationChannel> {
        self.channels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Notifications received so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NotificationSink for RecordingSink {
    fn register_channel(&self, channel: &NotificationChannel) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        if !channels.iter().any(|c| c.id == channel.id) {
            channels.push(channel.clone());
        }
    }

    fn notify(&self, notification: &Notification) {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}
