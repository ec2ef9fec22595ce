/*!
 * Metrics
 * Optimization counters and the composite metrics snapshot
 */

use super::history::{CollectionEvent, CollectionStats};
use super::leak::LeakSuspect;
use super::pressure::PressureReading;
use super::sampler::Snapshot;
use super::streaming::StreamStats;
use crate::core::serde::is_zero_u64;
use crate::memory::{Capabilities, PoolManagerStats};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters bumped by remediation and analysis
///
/// # Performance
/// - Cache-line aligned; bumped from the scheduler and `optimize_now` alike
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct OptimizationCounters {
    gc_runs: AtomicU64,
    incremental_runs: AtomicU64,
    compactions: AtomicU64,
    emergency_cleanups: AtomicU64,
    pool_cleanups: AtomicU64,
    defragmentations: AtomicU64,
    leaks_detected: AtomicU64,
    manual_optimizations: AtomicU64,
    pressure_passes: AtomicU64,
    actions_failed: AtomicU64,
}

macro_rules! counter {
    ($inc:ident, $field:ident) => {
        #[inline]
        pub fn $inc(&self) -> u64 {
            self.$field.fetch_add(1, Ordering::Relaxed) + 1
        }
    };
}

impl OptimizationCounters {
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_gc_run, gc_runs);
    counter!(record_incremental_run, incremental_runs);
    counter!(record_compaction, compactions);
    counter!(record_emergency_cleanup, emergency_cleanups);
    counter!(record_pool_cleanup, pool_cleanups);
    counter!(record_defragmentation, defragmentations);
    counter!(record_manual_optimization, manual_optimizations);
    counter!(record_pressure_pass, pressure_passes);
    counter!(record_action_failure, actions_failed);

    #[inline]
    pub fn record_leaks(&self, count: u64) {
        self.leaks_detected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> OptimizationStats {
        OptimizationStats {
            gc_runs: self.gc_runs.load(Ordering::Relaxed),
            incremental_runs: self.incremental_runs.load(Ordering::Relaxed),
            compactions: self.compactions.load(Ordering::Relaxed),
            emergency_cleanups: self.emergency_cleanups.load(Ordering::Relaxed),
            pool_cleanups: self.pool_cleanups.load(Ordering::Relaxed),
            defragmentations: self.defragmentations.load(Ordering::Relaxed),
            leaks_detected: self.leaks_detected.load(Ordering::Relaxed),
            manual_optimizations: self.manual_optimizations.load(Ordering::Relaxed),
            pressure_passes: self.pressure_passes.load(Ordering::Relaxed),
            actions_failed: self.actions_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationStats {
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub gc_runs: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub incremental_runs: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub compactions: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub emergency_cleanups: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub pool_cleanups: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub defragmentations: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub leaks_detected: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub manual_optimizations: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub pressure_passes: u64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub actions_failed: u64,
}

/// Read-only composite returned by `MemoryOrchestrator::metrics()`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp_ms: u64,
    /// Time since the baseline snapshot; 0 while stopped
    pub uptime_ms: u64,
    pub running: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<Arc<Snapshot>>,
    pub pressure: PressureReading,
    pub fragmentation: f64,
    pub collection_history: Vec<CollectionEvent>,
    pub collection_stats: CollectionStats,
    pub leaks: Vec<LeakSuspect>,
    pub pools: PoolManagerStats,
    pub optimizations: OptimizationStats,
    pub capabilities: Capabilities,
    pub events: StreamStats,
    pub health_score: f64,
}
