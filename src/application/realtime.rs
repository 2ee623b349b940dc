//! Background tasks that move recorded changes from the event log to the
//! bus, and from the bus into the storefront cache.
//!
//! ```text
//! realtime_events ──poll──▶ EventRelay ──▶ EventBus ──recv──▶ RealTimeSync ──▶ StorefrontCache
//! ```

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::broadcast;

use super::cache::StorefrontCache;
use crate::domain::errors::DomainError;
use crate::domain::events::{EventBus, RealtimeEvent};
use crate::domain::ports::EventLog;

/// Rows read from the log per poll.
const BATCH_SIZE: i64 = 100;

pub struct EventRelay {
    log: Arc<dyn EventLog>,
    bus: EventBus,
    cursor: i64,
}

impl EventRelay {
    /// Relay only the events recorded from now on.
    pub async fn starting_at_latest(
        log: Arc<dyn EventLog>,
        bus: EventBus,
    ) -> Result<Self, DomainError> {
        let cursor = log.latest_sequence().await?;
        Ok(Self::from_cursor(log, bus, cursor))
    }

    pub fn from_cursor(log: Arc<dyn EventLog>, bus: EventBus, cursor: i64) -> Self {
        Self { log, bus, cursor }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Publish one batch of new events in sequence order. Returns how many
    /// were published.
    pub async fn pump(&mut self) -> Result<usize, DomainError> {
        let events = self.log.read_after(self.cursor, BATCH_SIZE).await?;
        for event in &events {
            let sequence = event.sequence;
            let reached = self.bus.publish(event.clone());
            debug!(
                "Relayed event #{} ({} {}) to {} subscriber(s)",
                sequence,
                event.entity.as_str(),
                event.action.as_str(),
                reached
            );
            self.cursor = sequence;
        }
        Ok(events.len())
    }

    /// Poll forever. Should be spawned as a background task.
    pub async fn run(mut self, interval: Duration) {
        info!("Event relay started at sequence {}", self.cursor);
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            loop {
                match self.pump().await {
                    Ok(n) if n as i64 == BATCH_SIZE => continue,
                    Ok(_) => break,
                    Err(e) => {
                        error!("Failed to read event log after #{}: {}", self.cursor, e);
                        break;
                    }
                }
            }
        }
    }
}

/// Keeps a [`StorefrontCache`] in step with the events on the bus.
pub struct RealTimeSync {
    cache: Arc<StorefrontCache>,
}

impl RealTimeSync {
    pub fn new(cache: Arc<StorefrontCache>) -> Self {
        Self { cache }
    }

    pub async fn handle(&self, event: &RealtimeEvent) {
        if let Err(e) = self.cache.apply(event).await {
            warn!(
                "Could not refresh cache for {} event #{}: {}",
                event.entity.as_str(),
                event.sequence,
                e
            );
        }
    }

    /// Consume events until the bus is dropped. Missed events are made up
    /// for by reloading everything.
    pub async fn run(self, mut rx: broadcast::Receiver<RealtimeEvent>) {
        info!("Real-time sync started");
        loop {
            match rx.recv().await {
                Ok(event) => self.handle(&event).await,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Real-time sync lagged, {} events skipped; reloading cache", count);
                    if let Err(e) = self.cache.refresh_all().await {
                        error!("Cache reload failed: {}", e);
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    info!("Event bus closed, stopping real-time sync");
                    break;
                }
            }
        }
    }
}
