/*!
 * History Store
 * Bounded snapshot and collection histories
 */

use super::sampler::Snapshot;
use crate::core::limits::{
    COLLECTION_HISTORY_CAP, COLLECTION_HISTORY_TRIM, SNAPSHOT_HISTORY_CAP, SNAPSHOT_HISTORY_TRIM,
};
use crate::core::serde::{serde_as, DurationMilliSeconds};
use crate::core::MonitorError;
use crate::memory::{CollectionKind, RemediationAction};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// What caused a recorded collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum CollectionTrigger {
    Action(RemediationAction),
    /// Reported by the runtime's collection observer
    Observed,
}

impl fmt::Display for CollectionTrigger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CollectionTrigger::Action(action) => f.write_str(action.name()),
            CollectionTrigger::Observed => f.write_str("observed"),
        }
    }
}

impl From<CollectionTrigger> for String {
    fn from(trigger: CollectionTrigger) -> Self {
        trigger.to_string()
    }
}

impl TryFrom<String> for CollectionTrigger {
    type Error = MonitorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == "observed" {
            Ok(CollectionTrigger::Observed)
        } else {
            value.parse().map(CollectionTrigger::Action)
        }
    }
}

/// One recorded collection
#[serde_as]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub timestamp_ms: u64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "duration_ms")]
    pub duration: Duration,
    pub kind: CollectionKind,
    pub action_type: CollectionTrigger,
    pub memory_freed: u64,
}

/// Aggregates over the collection history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionStats {
    pub count: usize,
    pub total_duration_ms: f64,
    pub average_duration_ms: f64,
    pub total_memory_freed: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_collection_ms: Option<u64>,
}

/// Chronological snapshot and collection histories
///
/// Snapshots are capped at 1000 and trimmed to the newest 500 on overflow;
/// collection events are capped at 200 and trimmed to the newest 100.
#[derive(Debug, Default)]
pub struct HistoryStore {
    snapshots: RwLock<VecDeque<Arc<Snapshot>>>,
    collections: RwLock<VecDeque<CollectionEvent>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot and return the shared handle
    pub fn push_snapshot(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut snapshots = self.snapshots.write();
        snapshots.push_back(Arc::clone(&snapshot));
        if snapshots.len() > SNAPSHOT_HISTORY_CAP {
            let excess = snapshots.len() - SNAPSHOT_HISTORY_TRIM;
            snapshots.drain(..excess);
        }
        snapshot
    }

    pub fn latest(&self) -> Option<Arc<Snapshot>> {
        self.snapshots.read().back().cloned()
    }

    /// Newest `count` snapshots, oldest first
    pub fn recent(&self, count: usize) -> Vec<Arc<Snapshot>> {
        let snapshots = self.snapshots.read();
        let skip = snapshots.len().saturating_sub(count);
        snapshots.iter().skip(skip).cloned().collect()
    }

    pub fn snapshot_len(&self) -> usize {
        self.snapshots.read().len()
    }

    pub fn record_collection(&self, event: CollectionEvent) {
        let mut collections = self.collections.write();
        collections.push_back(event);
        if collections.len() > COLLECTION_HISTORY_CAP {
            let excess = collections.len() - COLLECTION_HISTORY_TRIM;
            collections.drain(..excess);
        }
    }

    pub fn collections(&self) -> Vec<CollectionEvent> {
        self.collections.read().iter().cloned().collect()
    }

    pub fn collection_len(&self) -> usize {
        self.collections.read().len()
    }

    pub fn collection_stats(&self) -> CollectionStats {
        let collections = self.collections.read();
        let count = collections.len();
        let total_duration_ms: f64 = collections
            .iter()
            .map(|event| event.duration.as_secs_f64() * 1000.0)
            .sum();

        CollectionStats {
            count,
            total_duration_ms,
            average_duration_ms: if count == 0 {
                0.0
            } else {
                total_duration_ms / count as f64
            },
            total_memory_freed: collections.iter().map(|event| event.memory_freed).sum(),
            last_collection_ms: collections.back().map(|event| event.timestamp_ms),
        }
    }

    /// Keep only the newest entries of both histories
    pub fn truncate_tails(&self, snapshot_tail: usize, collection_tail: usize) {
        {
            let mut snapshots = self.snapshots.write();
            let excess = snapshots.len().saturating_sub(snapshot_tail);
            snapshots.drain(..excess);
        }
        let mut collections = self.collections.write();
        let excess = collections.len().saturating_sub(collection_tail);
        collections.drain(..excess);
    }

    pub fn clear(&self) {
        self.snapshots.write().clear();
        self.collections.write().clear();
    }
}
