/*!
 * Event Streaming
 * Broadcast distribution of monitor events
 *
 * Design: many producers (scheduler ticks, remediation, observer callback),
 * many consumers (`subscribe()`), bounded memory. Slow consumers lag and
 * skip events rather than blocking producers.
 */

use crate::core::limits::EVENT_CHANNEL_CAPACITY;
use crate::monitoring::events::MonitorEvent;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event statistics for monitoring the monitor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStats {
    pub events_produced: u64,
    /// Events published while nobody was subscribed
    pub events_undelivered: u64,
    pub active_subscribers: usize,
}

/// Broadcast event bus; clones share the same channel
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<MonitorEvent>,
    produced: Arc<AtomicU64>,
    undelivered: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            produced: Arc::new(AtomicU64::new(0)),
            undelivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Publish an event; never blocks
    #[inline]
    pub fn publish(&self, event: MonitorEvent) {
        self.produced.fetch_add(1, Ordering::Relaxed);
        if self.sender.send(event).is_err() {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.sender.subscribe()
    }

    pub fn stats(&self) -> StreamStats {
        StreamStats {
            events_produced: self.produced.load(Ordering::Relaxed),
            events_undelivered: self.undelivered.load(Ordering::Relaxed),
            active_subscribers: self.sender.receiver_count(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
