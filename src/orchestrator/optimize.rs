/*!
 * Manual Optimization
 * Options and report for `optimize_now`
 */

use crate::memory::{ActionFailureReport, PassReport, RemediationAction};
use serde::{Deserialize, Serialize};

/// What `optimize_now` should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeOptions {
    pub force_gc: bool,
    pub force_compaction: bool,
    pub clean_pools: bool,
    /// Add emergency cleanup and defragmentation
    pub aggressive: bool,
}

impl Default for OptimizeOptions {
    fn default() -> Self {
        Self {
            force_gc: true,
            force_compaction: false,
            clean_pools: true,
            aggressive: false,
        }
    }
}

impl OptimizeOptions {
    /// Everything, including the aggressive steps
    pub fn full() -> Self {
        Self {
            force_gc: true,
            force_compaction: true,
            clean_pools: true,
            aggressive: true,
        }
    }

    /// Ordered action list for these options
    pub fn actions(&self) -> Vec<RemediationAction> {
        let mut actions = Vec::with_capacity(5);
        if self.force_gc {
            actions.push(RemediationAction::GcFull);
        }
        if self.force_compaction {
            actions.push(RemediationAction::HeapCompaction);
        }
        if self.clean_pools {
            actions.push(RemediationAction::MemoryPoolCleanup);
        }
        if self.aggressive {
            actions.push(RemediationAction::EmergencyCleanup);
            actions.push(RemediationAction::Defragmentation);
        }
        actions
    }
}

/// Outcome of a manual optimization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub duration_ms: u64,
    /// Bytes freed by collections; 0 without a collection primitive
    pub memory_freed: u64,
    pub actions: Vec<RemediationAction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ActionFailureReport>,
}

impl OptimizationReport {
    pub(crate) fn from_pass(pass: PassReport, duration_ms: u64) -> Self {
        Self {
            duration_ms,
            memory_freed: pass.memory_freed,
            actions: pass.completed,
            failures: pass.failures,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failures.is_empty()
    }
}
