/*!
 * Snapshot Sampler
 * Turns raw memory readings into immutable, timestamped snapshots
 */

use super::pressure::{fragmentation, PressureReading};
use crate::core::limits::MIB;
use crate::core::now_ms;
use crate::memory::{HeapStatistics, MemoryReading, MemorySource, ProcessMemory, SystemMemory};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Point-in-time memory snapshot
///
/// Never mutated after creation; shared as `Arc<Snapshot>` between the
/// history store, events and metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp_ms: u64,
    pub process: ProcessMemory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap: Option<HeapStatistics>,
    pub system: SystemMemory,
    pub pressure: PressureReading,
    pub fragmentation: f64,
}

impl Snapshot {
    pub fn from_reading(reading: MemoryReading, timestamp_ms: u64) -> Self {
        let pressure = PressureReading::compute(&reading.process, &reading.system);
        let fragmentation = fragmentation(reading.heap.as_ref());

        Self {
            timestamp_ms,
            process: reading.process,
            heap: reading.heap,
            system: reading.system,
            pressure,
            fragmentation,
        }
    }

    #[inline]
    pub fn heap_used_mib(&self) -> f64 {
        self.process.heap_used as f64 / MIB
    }

    #[inline]
    pub fn external_mib(&self) -> f64 {
        self.process.external as f64 / MIB
    }
}

/// Samples the configured memory source
#[derive(Clone)]
pub struct Sampler {
    source: Arc<dyn MemorySource>,
}

impl Sampler {
    pub fn new(source: Arc<dyn MemorySource>) -> Self {
        Self { source }
    }

    /// Take a snapshot now
    pub fn sample(&self) -> Snapshot {
        Snapshot::from_reading(self.source.read(), now_ms())
    }

    /// Current heap usage without building a snapshot
    #[inline]
    pub fn heap_used(&self) -> u64 {
        self.source.read().process.heap_used
    }
}
