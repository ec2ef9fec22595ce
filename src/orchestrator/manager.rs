/*!
 * Memory Orchestrator
 * Public surface: lifecycle, pools, manual optimization, metrics, events
 */

use super::builder::MemoryOrchestratorBuilder;
use super::optimize::{OptimizationReport, OptimizeOptions};
use super::scheduler_task::{MonitorTask, SchedulerTask};
use super::state::MonitorState;
use crate::config::MonitorConfig;
use crate::core::MonitorResult;
use crate::memory::{PoolObject, RemediationAction};
use crate::monitoring::{GcAdvice, LeakSuspect, MetricsSnapshot, MonitorEvent, Snapshot};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Adaptive memory-pressure monitor and collection orchestrator
///
/// Nothing here returns an internal error: remediation failures surface as
/// `ActionFailed` events and in reports. Only construction can fail, on an
/// invalid configuration.
pub struct MemoryOrchestrator {
    state: Arc<MonitorState>,
    scheduler: Mutex<Option<SchedulerTask>>,
}

impl MemoryOrchestrator {
    /// Build with the given configuration and the default runtime and source
    pub fn new(config: MonitorConfig) -> MonitorResult<Self> {
        Self::builder().with_config(config).build()
    }

    pub fn builder() -> MemoryOrchestratorBuilder {
        MemoryOrchestratorBuilder::new()
    }

    pub(super) fn from_state(state: Arc<MonitorState>) -> Self {
        Self {
            state,
            scheduler: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        self.state.config()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Take the baseline and start the cadences
    ///
    /// Needs a tokio runtime. Returns false when already running or when
    /// called outside a runtime.
    pub fn start(&self) -> bool {
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("start() called outside a tokio runtime, monitor not started");
            return false;
        }
        if !self.state.begin() {
            return false;
        }

        *self.scheduler.lock() = Some(SchedulerTask::spawn(Arc::clone(&self.state)));
        true
    }

    /// Stop the cadences and wait for the scheduler to exit
    ///
    /// In-flight remediation passes abandon their remaining bursts. Returns
    /// false when the monitor was not running.
    pub async fn stop(&self) -> bool {
        if !self.state.end() {
            return false;
        }

        let task = self.scheduler.lock().take();
        if let Some(task) = task {
            task.shutdown().await;
        }
        self.state.finish_stop();
        true
    }

    /// Check out a pooled object able to hold `size` bytes
    ///
    /// `None` when pooling is disabled.
    pub fn allocate_from_pool(&self, size: usize) -> Option<PoolObject> {
        self.state.pools().allocate(size)
    }

    /// Return a pooled object; a rejected object is handed back in `Err`
    pub fn return_to_pool(&self, obj: PoolObject, size: usize) -> Result<(), PoolObject> {
        self.state.pools().release(obj, size)
    }

    pub async fn optimize_now(&self, options: OptimizeOptions) -> OptimizationReport {
        self.state.optimize_now(options).await
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.state.metrics()
    }

    pub fn health_score(&self) -> f64 {
        self.state.health_score()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.state.events().subscribe()
    }

    pub fn leak_suspects(&self) -> Vec<LeakSuspect> {
        self.state.leaks().active()
    }

    pub fn clear_leak_suspects(&self) {
        self.state.leaks().clear();
    }

    /// Ask the scheduler to run a cadence now; false when not running
    pub fn trigger(&self, task: MonitorTask) -> bool {
        match self.scheduler.lock().as_ref() {
            Some(scheduler) if self.is_running() => {
                scheduler.trigger(task);
                true
            }
            _ => false,
        }
    }

    /// One monitoring tick, outside the scheduler
    pub async fn monitor_tick(&self) -> Option<Arc<Snapshot>> {
        self.state.monitor_tick().await
    }

    pub async fn gc_optimization_tick(&self) -> GcAdvice {
        self.state.gc_optimization_tick().await
    }

    pub fn leak_detection_tick(&self) -> Vec<LeakSuspect> {
        self.state.leak_detection_tick()
    }

    pub async fn heap_optimization_tick(&self) -> Option<RemediationAction> {
        self.state.heap_optimization_tick().await
    }
}

impl Drop for MemoryOrchestrator {
    fn drop(&mut self) {
        if self.state.end() {
            // SchedulerTask's own Drop sends Shutdown
            self.scheduler.lock().take();
        }
    }
}
