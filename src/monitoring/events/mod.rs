/*!
 * Monitor Events
 * Strongly-typed notifications pushed to subscribers
 */

use crate::core::MonitorError;
use crate::memory::{CollectionKind, MemoryPressure, RemediationAction};
use crate::monitoring::leak::LeakSuspect;
use crate::monitoring::pressure::PressureReading;
use crate::monitoring::sampler::Snapshot;
use crate::orchestrator::OptimizationReport;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Event severity for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Severity {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

/// Everything the monitor reports
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum MonitorEvent {
    Started {
        timestamp_ms: u64,
        baseline: Arc<Snapshot>,
    },
    Stopped {
        timestamp_ms: u64,
        uptime_ms: u64,
    },
    MemoryMonitored {
        snapshot: Arc<Snapshot>,
    },
    MemoryPressure {
        pressure: PressureReading,
        level: MemoryPressure,
        /// Actions planned for this tick; empty while cooling down
        actions: Vec<RemediationAction>,
    },
    GcCompleted {
        action: RemediationAction,
        duration_ms: u64,
        memory_freed: u64,
    },
    /// Collection reported by the runtime observer
    GcEvent {
        kind: CollectionKind,
        duration_ms: u64,
    },
    HeapCompacted {
        bursts: usize,
        compactions: u64,
    },
    EmergencyCleanup {
        pool_objects_released: usize,
        memory_freed: u64,
    },
    DefragmentationCompleted {
        duration_ms: u64,
    },
    MemoryLeakDetected {
        suspect: LeakSuspect,
    },
    ManualOptimization {
        report: OptimizationReport,
    },
    ActionFailed {
        action: String,
        error: MonitorError,
    },
}

impl MonitorEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            MonitorEvent::Started { .. } => "started",
            MonitorEvent::Stopped { .. } => "stopped",
            MonitorEvent::MemoryMonitored { .. } => "memory-monitored",
            MonitorEvent::MemoryPressure { .. } => "memory-pressure",
            MonitorEvent::GcCompleted { .. } => "gc-completed",
            MonitorEvent::GcEvent { .. } => "gc-event",
            MonitorEvent::HeapCompacted { .. } => "heap-compacted",
            MonitorEvent::EmergencyCleanup { .. } => "emergency-cleanup",
            MonitorEvent::DefragmentationCompleted { .. } => "defragmentation-completed",
            MonitorEvent::MemoryLeakDetected { .. } => "memory-leak-detected",
            MonitorEvent::ManualOptimization { .. } => "manual-optimization",
            MonitorEvent::ActionFailed { .. } => "action-failed",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            MonitorEvent::MemoryMonitored { .. } | MonitorEvent::GcEvent { .. } => Severity::Debug,
            MonitorEvent::MemoryPressure { .. }
            | MonitorEvent::EmergencyCleanup { .. }
            | MonitorEvent::MemoryLeakDetected { .. } => Severity::Warn,
            MonitorEvent::ActionFailed { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }
}
