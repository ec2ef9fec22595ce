/*!
 * Monitor Limits and Constants
 *
 * Centralized location for history caps, decision thresholds and burst counts.
 * Organized by component. Values a user may want to tune live in `MonitorConfig`;
 * everything here is fixed behaviour.
 */

use std::time::Duration;

/// One mebibyte, the unit trend series are expressed in
pub const MIB: f64 = 1024.0 * 1024.0;

// =============================================================================
// HISTORY STORE
// =============================================================================

/// Snapshot history overflows past this many entries
pub const SNAPSHOT_HISTORY_CAP: usize = 1000;

/// Snapshot history is trimmed to the newest N entries on overflow
pub const SNAPSHOT_HISTORY_TRIM: usize = 500;

/// Collection event history overflow point
pub const COLLECTION_HISTORY_CAP: usize = 200;

/// Collection event history is trimmed to the newest N entries on overflow
pub const COLLECTION_HISTORY_TRIM: usize = 100;

/// Snapshot tail kept by an emergency cleanup
pub const EMERGENCY_SNAPSHOT_TAIL: usize = 50;

/// Collection event tail kept by an emergency cleanup
pub const EMERGENCY_COLLECTION_TAIL: usize = 20;

// =============================================================================
// PRESSURE
// =============================================================================

/// External memory is measured against this fraction of the heap
pub const EXTERNAL_BUDGET_RATIO: f64 = 0.1;

/// System pressure above this escalates to an emergency cleanup
pub const SYSTEM_PRESSURE_EMERGENCY: f64 = 0.9;

// =============================================================================
// TREND ANALYSIS
// =============================================================================

/// Snapshots fed into the GC-need regression
pub const GC_TREND_WINDOW: usize = 10;

/// Overall pressure that recommends a collection regardless of trend
pub const GC_PRESSURE_TRIGGER: f64 = 0.7;

/// Heap growth (MiB per sample) that recommends a collection
pub const GC_SLOPE_TRIGGER: f64 = 0.05;

/// Snapshots fed into the leak regression
pub const LEAK_TREND_WINDOW: usize = 30;

/// Leak detection needs at least this many samples
pub const LEAK_MIN_SAMPLES: usize = 10;

/// Pearson r a heap-growth leak has to exceed
pub const LEAK_CORRELATION_GATE: f64 = 0.8;

/// External growth is flagged at this fraction of the leak threshold
pub const EXTERNAL_LEAK_FACTOR: f64 = 0.5;

/// Heap-growth leaks past this multiple of the threshold are high severity
pub const LEAK_ESCALATION_FACTOR: f64 = 5.0;

/// Leak suspects older than this are evicted
pub const LEAK_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Slopes smaller than this in magnitude count as stable
pub const STABLE_SLOPE_EPSILON: f64 = 1e-9;

// =============================================================================
// REMEDIATION
// =============================================================================

/// Bursts used to approximate a non-blocking incremental collection
pub const INCREMENTAL_BURSTS: usize = 10;

/// Bursts used to approximate heap compaction
pub const COMPACTION_BURSTS: usize = 3;

/// Bursts run by an emergency cleanup
pub const EMERGENCY_BURSTS: usize = 5;

/// Extra bursts run by defragmentation after compacting
pub const DEFRAG_EXTRA_BURSTS: usize = 5;

/// Pause between defragmentation bursts
pub const DEFRAG_BURST_DELAY: Duration = Duration::from_millis(10);

/// Collections slower than this on average cost health points
pub const SLOW_COLLECTION_MS: f64 = 50.0;

// =============================================================================
// POOLS
// =============================================================================

/// Available objects kept per pool by an emergency cleanup
pub const EMERGENCY_POOL_TAIL: usize = 10;

/// Fraction of available objects kept by a pool cleanup
pub const POOL_CLEANUP_KEEP_RATIO: f64 = 0.1;

/// Efficiency above which a pool grows
pub const POOL_EXPAND_EFFICIENCY: f64 = 0.8;

/// A pool only grows while fewer than this many objects are available
pub const POOL_EXPAND_AVAILABLE_BELOW: usize = 10;

/// Growth step as a fraction of the pool's capacity
pub const POOL_EXPAND_RATIO: f64 = 0.2;

/// Efficiency below which a pool shrinks
pub const POOL_SHRINK_EFFICIENCY: f64 = 0.2;

/// A pool only shrinks while more than this fraction of capacity is idle
pub const POOL_SHRINK_AVAILABLE_ABOVE: f64 = 0.5;

/// Shrink step as a fraction of the pool's capacity
pub const POOL_SHRINK_RATIO: f64 = 0.1;

// =============================================================================
// HEALTH
// =============================================================================

pub const HEALTH_PRESSURE_WEIGHT: f64 = 30.0;
pub const HEALTH_FRAGMENTATION_WEIGHT: f64 = 20.0;
pub const HEALTH_LEAK_PENALTY: f64 = 10.0;
pub const HEALTH_SLOW_GC_PENALTY: f64 = 15.0;
pub const HEALTH_POOL_BONUS: f64 = 10.0;

// =============================================================================
// EVENTS
// =============================================================================

/// Broadcast buffer per subscriber; slow subscribers lag past this
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;
