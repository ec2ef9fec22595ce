/*!
 * Pressure Calculator
 * Heap, system and external pressure plus heap fragmentation
 */

use crate::core::limits::EXTERNAL_BUDGET_RATIO;
use crate::memory::{HeapStatistics, MemoryPressure, ProcessMemory, SystemMemory};
use serde::{Deserialize, Serialize};

/// Pressure ratios, each in [0, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureReading {
    pub heap: f64,
    pub system: f64,
    pub external: f64,
    /// Mean of the three components
    pub overall: f64,
}

impl PressureReading {
    pub fn compute(process: &ProcessMemory, system: &SystemMemory) -> Self {
        let heap = ratio(process.heap_used as f64, process.heap_total as f64);
        let system_pressure = ratio(
            system.total.saturating_sub(system.free) as f64,
            system.total as f64,
        );
        let external = ratio(
            process.external as f64,
            process.heap_total as f64 * EXTERNAL_BUDGET_RATIO,
        );

        Self {
            heap,
            system: system_pressure,
            external,
            overall: clamp_unit((heap + system_pressure + external) / 3.0),
        }
    }

    #[inline]
    pub fn level(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(self.overall)
    }
}

/// `1 - used/total` of the runtime heap, 0 without heap statistics
pub fn fragmentation(heap: Option<&HeapStatistics>) -> f64 {
    match heap {
        Some(stats) if stats.total_heap_size > 0 => {
            clamp_unit(1.0 - ratio(stats.used_heap_size as f64, stats.total_heap_size as f64))
        }
        _ => 0.0,
    }
}

/// `numerator / denominator` clamped to [0, 1]
///
/// Zero or non-finite denominators yield 0.
#[inline]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 || !denominator.is_finite() {
        return 0.0;
    }
    clamp_unit(numerator / denominator)
}

#[inline]
fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
