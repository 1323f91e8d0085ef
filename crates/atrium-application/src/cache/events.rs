//! Cache event bus
//!
//! Publishes [`CacheEvent`]s over a `tokio` broadcast channel. Publishing
//! never blocks and never fails the cache operation that produced the event;
//! with no subscribers events are dropped.

use atrium_domain::constants::DEFAULT_EVENT_CHANNEL_CAPACITY;
use atrium_domain::events::CacheEvent;
use tokio::sync::broadcast::{self, Receiver, Sender};

/// Event bus for cache activity
#[derive(Debug, Clone)]
pub struct CacheEventBus {
    sender: Sender<CacheEvent>,
}

impl CacheEventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns how many subscribers received it
    pub fn publish(&self, event: CacheEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to receive events
    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CHANNEL_CAPACITY)
    }
}
