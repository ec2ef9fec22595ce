/*!
 * Collection Advisor
 * Trend-driven collection and heap-optimization recommendations
 */

use super::trend::Trend;
use crate::core::limits::{GC_PRESSURE_TRIGGER, GC_SLOPE_TRIGGER};
use crate::memory::RemediationAction;
use crate::monitoring::sampler::Snapshot;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Recommendation from the GC-optimization cadence
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GcAdvice {
    /// `gc_full` under high overall pressure, `gc_incremental` on steady growth
    pub collection: Option<RemediationAction>,
    pub compaction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heap_trend: Option<Trend>,
}

impl GcAdvice {
    pub fn is_empty(&self) -> bool {
        self.collection.is_none() && !self.compaction
    }
}

/// Evaluate collection need over a window of snapshots (oldest first)
pub fn advise_gc(window: &[Arc<Snapshot>], fragmentation_threshold: f64) -> GcAdvice {
    let Some(latest) = window.last() else {
        return GcAdvice::default();
    };

    let series: Vec<f64> = window.iter().map(|s| s.heap_used_mib()).collect();
    let heap_trend = Trend::fit(&series);
    let slope = heap_trend.map(|t| t.slope).unwrap_or(0.0);

    let collection = if latest.pressure.overall > GC_PRESSURE_TRIGGER {
        Some(RemediationAction::GcFull)
    } else if slope > GC_SLOPE_TRIGGER {
        Some(RemediationAction::GcIncremental)
    } else {
        None
    };

    GcAdvice {
        collection,
        compaction: latest.fragmentation > fragmentation_threshold,
        heap_trend,
    }
}

/// Heap-optimization step for the latest fragmentation reading
pub fn advise_heap(fragmentation: f64, threshold: f64) -> Option<RemediationAction> {
    if fragmentation > threshold {
        Some(RemediationAction::Defragmentation)
    } else if fragmentation > threshold / 2.0 {
        Some(RemediationAction::HeapCompaction)
    } else {
        None
    }
}
