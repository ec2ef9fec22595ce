/*!
 * Remediation Dispatcher
 * Runs action lists, one error boundary per action
 */

use super::actions::RemediationAction;
use super::collector::{Collector, GcStats};
use crate::core::limits::{
    COMPACTION_BURSTS, DEFRAG_BURST_DELAY, DEFRAG_EXTRA_BURSTS, EMERGENCY_BURSTS,
    EMERGENCY_COLLECTION_TAIL, EMERGENCY_SNAPSHOT_TAIL, INCREMENTAL_BURSTS,
};
use crate::core::{duration_ms, now_ms, MonitorError, MonitorResult, PassGuard};
use crate::memory::pool::PoolManager;
use crate::memory::CollectionKind;
use crate::monitoring::{
    ActionSpan, CollectionEvent, CollectionTrigger, EventBus, HistoryStore, MonitorEvent,
    OptimizationCounters,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

/// Action that failed inside a pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionFailureReport {
    pub action: String,
    pub error: MonitorError,
}

/// Result of running an action list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PassReport {
    /// Actions that completed, in order
    pub completed: Vec<RemediationAction>,
    pub failures: Vec<ActionFailureReport>,
    pub memory_freed: u64,
    /// The pass stopped early because the monitor stopped
    pub cancelled: bool,
}

impl PassReport {
    fn absorb_failure(&mut self, action: String, error: MonitorError) {
        self.failures.push(ActionFailureReport { action, error });
    }
}

/// Executes remediation actions against the shared monitor state
#[derive(Clone)]
pub struct Dispatcher {
    collector: Collector,
    pools: Arc<PoolManager>,
    history: Arc<HistoryStore>,
    events: EventBus,
    counters: Arc<OptimizationCounters>,
}

impl Dispatcher {
    pub fn new(
        collector: Collector,
        pools: Arc<PoolManager>,
        history: Arc<HistoryStore>,
        events: EventBus,
        counters: Arc<OptimizationCounters>,
    ) -> Self {
        Self {
            collector,
            pools,
            history,
            events,
            counters,
        }
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    /// Run actions in order; a failing action never stops the ones after it
    pub async fn run(&self, actions: &[RemediationAction], guard: &PassGuard) -> PassReport {
        let mut report = PassReport::default();

        for &action in actions {
            if guard.is_cancelled() {
                report.cancelled = true;
                debug!(action = %action, "Pass cancelled before action");
                break;
            }

            match self.execute(action, guard).await {
                Ok(freed) => {
                    report.memory_freed += freed;
                    report.completed.push(action);
                }
                Err(error) => {
                    self.report_failure(action.name(), &error);
                    report.absorb_failure(action.name().to_string(), error);
                }
            }
        }

        report
    }

    /// Parse and run named actions; unknown names are warned about and skipped
    pub async fn run_named<S: AsRef<str>>(&self, names: &[S], guard: &PassGuard) -> PassReport {
        let mut actions = Vec::with_capacity(names.len());
        let mut skipped = Vec::new();

        for name in names {
            match name.as_ref().parse::<RemediationAction>() {
                Ok(action) => actions.push(action),
                Err(error) => {
                    warn!(action = name.as_ref(), "Skipping unknown remediation action");
                    skipped.push(ActionFailureReport {
                        action: name.as_ref().to_string(),
                        error,
                    });
                }
            }
        }

        let mut report = self.run(&actions, guard).await;
        report.failures.extend(skipped);
        report
    }

    /// Self-tune pools at the end of a memory action pass
    pub fn finish_pass(&self) {
        let tuned = self
            .pools
            .self_tune()
            .into_iter()
            .filter(|(_, adjustment)| *adjustment != crate::memory::PoolAdjustment::Unchanged)
            .count();
        let prewarmed = self.pools.predictive_prewarm();
        if tuned > 0 || prewarmed > 0 {
            debug!(tuned, prewarmed, "Pools adjusted after pass");
        }
    }

    fn report_failure(&self, action: &str, error: &MonitorError) {
        warn!(action, error = %error, "Remediation action failed");
        self.counters.record_action_failure();
        self.events.publish(MonitorEvent::ActionFailed {
            action: action.to_string(),
            error: error.clone(),
        });
    }

    /// Run one action; returns bytes freed
    pub async fn execute(&self, action: RemediationAction, guard: &PassGuard) -> MonitorResult<u64> {
        let span = ActionSpan::new(action);
        let result = async {
            match action {
                RemediationAction::GcFull => self.gc_full(),
                RemediationAction::GcIncremental => self.gc_incremental(guard).await,
                RemediationAction::HeapCompaction => self.heap_compaction(guard).await,
                RemediationAction::EmergencyCleanup => self.emergency_cleanup(guard).await,
                RemediationAction::MemoryPoolCleanup => Ok(self.memory_pool_cleanup()),
                RemediationAction::Defragmentation => self.defragmentation(guard).await,
            }
        }
        .instrument(span.span().clone())
        .await;

        span.record_result(result.is_ok());
        result
    }

    /// Missing collector degrades to an empty result
    fn tolerate_missing(action: RemediationAction, result: MonitorResult<GcStats>) -> MonitorResult<GcStats> {
        match result {
            Err(error) if error.is_missing_capability() => {
                warn!(action = %action, "No collection primitive available, skipping collection");
                Ok(GcStats::new())
            }
            other => other,
        }
    }

    fn record_collection(&self, kind: CollectionKind, action: RemediationAction, stats: &GcStats) {
        self.history.record_collection(CollectionEvent {
            timestamp_ms: now_ms(),
            duration: stats.duration,
            kind,
            action_type: CollectionTrigger::Action(action),
            memory_freed: stats.freed_bytes,
        });
    }

    fn gc_full(&self) -> MonitorResult<u64> {
        let action = RemediationAction::GcFull;
        let stats = Self::tolerate_missing(action, self.collector.collect_full())?;
        if stats.bursts == 0 {
            return Ok(0);
        }

        self.record_collection(CollectionKind::Full, action, &stats);
        self.counters.record_gc_run();
        self.events.publish(MonitorEvent::GcCompleted {
            action,
            duration_ms: duration_ms(stats.duration),
            memory_freed: stats.freed_bytes,
        });
        info!(
            freed = stats.freed_bytes,
            duration_ms = duration_ms(stats.duration),
            "Full collection completed"
        );
        Ok(stats.freed_bytes)
    }

    async fn gc_incremental(&self, guard: &PassGuard) -> MonitorResult<u64> {
        let action = RemediationAction::GcIncremental;
        let stats = Self::tolerate_missing(
            action,
            self.collector.bursts(INCREMENTAL_BURSTS, None, guard).await,
        )?;
        if stats.bursts == 0 {
            return Ok(0);
        }

        self.record_collection(CollectionKind::Incremental, action, &stats);
        self.counters.record_incremental_run();
        self.events.publish(MonitorEvent::GcCompleted {
            action,
            duration_ms: duration_ms(stats.duration),
            memory_freed: stats.freed_bytes,
        });
        debug!(bursts = stats.bursts, freed = stats.freed_bytes, "Incremental collection completed");
        Ok(stats.freed_bytes)
    }

    async fn heap_compaction(&self, guard: &PassGuard) -> MonitorResult<u64> {
        let action = RemediationAction::HeapCompaction;
        let stats = Self::tolerate_missing(
            action,
            self.collector.bursts(COMPACTION_BURSTS, None, guard).await,
        )?;

        let compactions = self.counters.record_compaction();
        self.events.publish(MonitorEvent::HeapCompacted {
            bursts: stats.bursts,
            compactions,
        });
        debug!(bursts = stats.bursts, compactions, "Heap compaction completed");
        Ok(stats.freed_bytes)
    }

    async fn emergency_cleanup(&self, guard: &PassGuard) -> MonitorResult<u64> {
        let action = RemediationAction::EmergencyCleanup;
        let released = self.pools.emergency_trim();
        self.history
            .truncate_tails(EMERGENCY_SNAPSHOT_TAIL, EMERGENCY_COLLECTION_TAIL);

        let stats = Self::tolerate_missing(
            action,
            self.collector.bursts(EMERGENCY_BURSTS, None, guard).await,
        )?;

        self.counters.record_emergency_cleanup();
        self.events.publish(MonitorEvent::EmergencyCleanup {
            pool_objects_released: released,
            memory_freed: stats.freed_bytes,
        });
        warn!(
            pool_objects_released = released,
            freed = stats.freed_bytes,
            "Emergency cleanup performed"
        );
        Ok(stats.freed_bytes)
    }

    fn memory_pool_cleanup(&self) -> u64 {
        let released = self.pools.cleanup();
        self.counters.record_pool_cleanup();
        debug!(released, "Pool cleanup completed");
        0
    }

    async fn defragmentation(&self, guard: &PassGuard) -> MonitorResult<u64> {
        let action = RemediationAction::Defragmentation;
        let start = Instant::now();

        let mut freed = self.heap_compaction(guard).await?;
        let stats = Self::tolerate_missing(
            action,
            self.collector
                .bursts(DEFRAG_EXTRA_BURSTS, Some(DEFRAG_BURST_DELAY), guard)
                .await,
        )?;
        freed += stats.freed_bytes;

        let elapsed: Duration = start.elapsed();
        self.counters.record_defragmentation();
        self.events.publish(MonitorEvent::DefragmentationCompleted {
            duration_ms: duration_ms(elapsed),
        });
        info!(duration_ms = duration_ms(elapsed), freed, "Defragmentation completed");
        Ok(freed)
    }
}
