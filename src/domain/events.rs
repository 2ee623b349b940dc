//! Real-time change notifications for admin-managed entities.
//!
//! Stores append an event row in the same transaction as the change; the
//! relay reads those rows and publishes them on an [`EventBus`] handle that
//! is created once at startup and passed to whoever needs it.
//!
//! ```text
//! store mutation ──▶ realtime_events row ──▶ EventRelay ──▶ EventBus ──▶ RealTimeSync
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventEntity {
    SiteSettings,
    Showrooms,
    NewsletterSubscriptions,
}

impl EventEntity {
    pub fn as_str(self) -> &'static str {
        match self {
            EventEntity::SiteSettings => "site_settings",
            EventEntity::Showrooms => "showrooms",
            EventEntity::NewsletterSubscriptions => "newsletter_subscriptions",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "site_settings" => Some(EventEntity::SiteSettings),
            "showrooms" => Some(EventEntity::Showrooms),
            "newsletter_subscriptions" => Some(EventEntity::NewsletterSubscriptions),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Created,
    Updated,
    Deleted,
}

impl EventAction {
    pub fn as_str(self) -> &'static str {
        match self {
            EventAction::Created => "created",
            EventAction::Updated => "updated",
            EventAction::Deleted => "deleted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(EventAction::Created),
            "updated" => Some(EventAction::Updated),
            "deleted" => Some(EventAction::Deleted),
            _ => None,
        }
    }
}

/// Change to be recorded alongside a store mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingEvent {
    pub entity: EventEntity,
    pub action: EventAction,
    pub data: serde_json::Value,
}

impl PendingEvent {
    pub fn new(entity: EventEntity, action: EventAction, data: serde_json::Value) -> Self {
        Self {
            entity,
            action,
            data,
        }
    }
}

/// A recorded change, as delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RealtimeEvent {
    /// Position in the event log; strictly increasing.
    pub sequence: i64,
    pub entity: EventEntity,
    pub action: EventAction,
    pub data: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<RealtimeEvent>,
}

impl EventBus {
    /// `capacity` is how many events a slow subscriber may fall behind
    /// before it starts receiving `Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Returns the number of subscribers the event reached. Publishing with
    /// no subscribers drops the event.
    pub fn publish(&self, event: RealtimeEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RealtimeEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
