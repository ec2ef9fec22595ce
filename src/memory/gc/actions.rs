/*!
 * Remediation Actions
 * Named actions and the pressure-driven action plan
 */

use crate::core::limits::SYSTEM_PRESSURE_EMERGENCY;
use crate::core::MonitorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Remediation action, in the order a pass may run them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    GcFull,
    GcIncremental,
    HeapCompaction,
    EmergencyCleanup,
    MemoryPoolCleanup,
    Defragmentation,
}

impl RemediationAction {
    pub const ALL: [RemediationAction; 6] = [
        RemediationAction::GcFull,
        RemediationAction::GcIncremental,
        RemediationAction::HeapCompaction,
        RemediationAction::EmergencyCleanup,
        RemediationAction::MemoryPoolCleanup,
        RemediationAction::Defragmentation,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RemediationAction::GcFull => "gc_full",
            RemediationAction::GcIncremental => "gc_incremental",
            RemediationAction::HeapCompaction => "heap_compaction",
            RemediationAction::EmergencyCleanup => "emergency_cleanup",
            RemediationAction::MemoryPoolCleanup => "memory_pool_cleanup",
            RemediationAction::Defragmentation => "defragmentation",
        }
    }
}

impl fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RemediationAction {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.name() == s)
            .ok_or_else(|| MonitorError::UnknownAction(s.to_string()))
    }
}

/// Inputs for building a pressure-pass plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanInputs {
    pub heap_pressure: f64,
    pub system_pressure: f64,
    pub fragmentation: f64,
    /// Host free memory has dropped below the configured floor
    pub below_free_floor: bool,
    pub pressure_threshold: f64,
    pub fragmentation_threshold: f64,
}

/// Ordered actions for one pressure pass
pub fn plan_actions(inputs: &PlanInputs) -> Vec<RemediationAction> {
    let mut actions = Vec::with_capacity(5);

    if inputs.heap_pressure > inputs.pressure_threshold {
        actions.push(RemediationAction::GcFull);
        actions.push(RemediationAction::HeapCompaction);
    }

    if inputs.system_pressure > SYSTEM_PRESSURE_EMERGENCY || inputs.below_free_floor {
        actions.push(RemediationAction::EmergencyCleanup);
        actions.push(RemediationAction::MemoryPoolCleanup);
    }

    if inputs.fragmentation > inputs.fragmentation_threshold {
        actions.push(RemediationAction::Defragmentation);
    }

    actions
}
