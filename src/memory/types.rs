/*!
 * Memory Types
 * Raw readings supplied by the memory source and the hosting runtime
 */

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Process-level memory figures (bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMemory {
    pub heap_used: u64,
    pub heap_total: u64,
    /// Memory held outside the managed heap
    pub external: u64,
    pub rss: u64,
}

/// Heap statistics reported by the runtime's introspection hook (bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeapStatistics {
    pub total_heap_size: u64,
    pub used_heap_size: u64,
    pub heap_size_limit: u64,
    #[serde(default)]
    pub total_available_size: u64,
    #[serde(default)]
    pub malloced_memory: u64,
}

/// Host memory figures (bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMemory {
    pub total: u64,
    pub free: u64,
    pub used: u64,
}

impl SystemMemory {
    /// Build from total/free, deriving `used`
    pub fn from_total_free(total: u64, free: u64) -> Self {
        Self {
            total,
            free: free.min(total),
            used: total.saturating_sub(free),
        }
    }
}

/// One raw reading, before pressure is derived
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryReading {
    pub process: ProcessMemory,
    pub heap: Option<HeapStatistics>,
    pub system: SystemMemory,
}

/// Runtime hooks the monitor can use when the host provides them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Explicit collection / reclamation primitive
    Collector,
    /// Heap statistics
    HeapIntrospection,
    /// Push notifications for collections the runtime performs itself
    CollectionObserver,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Capability::Collector => write!(f, "collector"),
            Capability::HeapIntrospection => write!(f, "heap_introspection"),
            Capability::CollectionObserver => write!(f, "collection_observer"),
        }
    }
}

/// Availability flags for every runtime hook
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub collector: bool,
    pub heap_introspection: bool,
    pub collection_observer: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        collector: false,
        heap_introspection: false,
        collection_observer: false,
    };

    pub fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Collector => self.collector,
            Capability::HeapIntrospection => self.heap_introspection,
            Capability::CollectionObserver => self.collection_observer,
        }
    }
}

/// Kind of collection recorded in the history store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    Full,
    Incremental,
    /// Minor / scavenge collection reported by the runtime
    Minor,
    /// Major / mark-sweep collection reported by the runtime
    Major,
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            CollectionKind::Full => write!(f, "full"),
            CollectionKind::Incremental => write!(f, "incremental"),
            CollectionKind::Minor => write!(f, "minor"),
            CollectionKind::Major => write!(f, "major"),
        }
    }
}

/// Collection reported by the runtime's observer hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservedCollection {
    pub kind: CollectionKind,
    pub duration: Duration,
}

/// Coarse pressure levels used in logs and events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    /// Classify an overall pressure ratio
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 0.95 {
            MemoryPressure::Critical
        } else if ratio >= 0.80 {
            MemoryPressure::High
        } else if ratio >= 0.60 {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
