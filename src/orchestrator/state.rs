/*!
 * Monitor State
 * Shared state and the per-cadence tick logic
 *
 * Tick outline:
 * Idle -> Sampling -> Nominal | UnderPressure -> Remediating -> Sampling
 */

use super::optimize::{OptimizationReport, OptimizeOptions};
use crate::config::MonitorConfig;
use crate::core::limits::{GC_TREND_WINDOW, LEAK_TREND_WINDOW};
use crate::core::{duration_ms, now_ms, CancelToken};
use crate::memory::{
    plan_actions, Capabilities, Dispatcher, ObservedCollection, PassReport, PlanInputs, PoolManager,
    RemediationAction,
};
use crate::monitoring::leak;
use crate::monitoring::{
    advise_gc, advise_heap, health_score, CollectionEvent, CollectionTrigger, EventBus, GcAdvice,
    HealthInputs, HistoryStore, LeakRegistry, LeakSuspect, MetricsSnapshot, MonitorEvent,
    OptimizationCounters, PressureReading, Sampler, Snapshot,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, info, warn};

/// State shared by the public handle, the scheduler and observer callbacks
pub struct MonitorState {
    config: MonitorConfig,
    sampler: Sampler,
    history: Arc<HistoryStore>,
    leaks: LeakRegistry,
    pools: Arc<PoolManager>,
    dispatcher: Dispatcher,
    events: EventBus,
    counters: Arc<OptimizationCounters>,
    running: AtomicBool,
    observer_installed: AtomicBool,
    baseline: RwLock<Option<Arc<Snapshot>>>,
    last_remediation: Mutex<Option<Instant>>,
    cancel: CancelToken,
}

impl MonitorState {
    pub(super) fn new(
        config: MonitorConfig,
        sampler: Sampler,
        history: Arc<HistoryStore>,
        pools: Arc<PoolManager>,
        dispatcher: Dispatcher,
        events: EventBus,
        counters: Arc<OptimizationCounters>,
    ) -> Self {
        Self {
            config,
            sampler,
            history,
            leaks: LeakRegistry::new(),
            pools,
            dispatcher,
            events,
            counters,
            running: AtomicBool::new(false),
            observer_installed: AtomicBool::new(false),
            baseline: RwLock::new(None),
            last_remediation: Mutex::new(None),
            cancel: CancelToken::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn pools(&self) -> &PoolManager {
        &self.pools
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn leaks(&self) -> &LeakRegistry {
        &self.leaks
    }

    pub fn capabilities(&self) -> Capabilities {
        self.dispatcher.collector().capabilities()
    }

    /// Flip to running and take the baseline; false if already running
    pub(super) fn begin(self: &Arc<Self>) -> bool {
        if self.running.swap(true, Ordering::AcqRel) {
            return false;
        }

        let baseline = self.history.push_snapshot(self.sampler.sample());
        *self.baseline.write() = Some(Arc::clone(&baseline));
        self.install_observer();

        info!(
            heap_used = baseline.process.heap_used,
            overall_pressure = baseline.pressure.overall,
            "Memory monitor started"
        );
        self.events.publish(MonitorEvent::Started {
            timestamp_ms: baseline.timestamp_ms,
            baseline,
        });
        true
    }

    /// Flip to stopped and cancel in-flight passes; false if not running
    pub(super) fn end(&self) -> bool {
        if !self.running.swap(false, Ordering::AcqRel) {
            return false;
        }
        self.cancel.cancel_all();
        true
    }

    /// Clear the baseline and announce the stop
    pub(super) fn finish_stop(&self) {
        let uptime_ms = self.uptime_ms();
        *self.baseline.write() = None;
        info!(uptime_ms, "Memory monitor stopped");
        self.events.publish(MonitorEvent::Stopped {
            timestamp_ms: now_ms(),
            uptime_ms,
        });
    }

    pub fn uptime_ms(&self) -> u64 {
        self.baseline
            .read()
            .as_ref()
            .map(|baseline| now_ms().saturating_sub(baseline.timestamp_ms))
            .unwrap_or(0)
    }

    /// Install the runtime collection observer once per monitor
    fn install_observer(self: &Arc<Self>) {
        if self.observer_installed.swap(true, Ordering::AcqRel) {
            return;
        }

        let weak: Weak<MonitorState> = Arc::downgrade(self);
        let callback = Arc::new(move |observed: ObservedCollection| {
            if let Some(state) = weak.upgrade() {
                state.record_observed(observed);
            }
        });

        if let Err(e) = self.dispatcher.collector().runtime().observe_collections(callback) {
            warn!(error = %e, "Collection observer unavailable, gc-event stream disabled");
        }
    }

    fn record_observed(&self, observed: ObservedCollection) {
        if !self.is_running() {
            return;
        }
        self.history.record_collection(CollectionEvent {
            timestamp_ms: now_ms(),
            duration: observed.duration,
            kind: observed.kind,
            action_type: CollectionTrigger::Observed,
            memory_freed: 0,
        });
        self.events.publish(MonitorEvent::GcEvent {
            kind: observed.kind,
            duration_ms: duration_ms(observed.duration),
        });
    }

    /// Sample, record, and remediate when over the pressure threshold
    pub async fn monitor_tick(&self) -> Option<Arc<Snapshot>> {
        if !self.is_running() {
            return None;
        }

        let snapshot = self.history.push_snapshot(self.sampler.sample());
        if !self.is_running() {
            return None;
        }
        self.events.publish(MonitorEvent::MemoryMonitored {
            snapshot: Arc::clone(&snapshot),
        });

        if snapshot.pressure.overall > self.config.memory_pressure_threshold {
            self.handle_pressure(&snapshot).await;
        }
        Some(snapshot)
    }

    fn cooling_down(&self) -> bool {
        let cooldown = self.config.remediation_cooldown;
        if cooldown.is_zero() {
            return false;
        }
        let last = *self.last_remediation.lock();
        last.is_some_and(|last| last.elapsed() < cooldown)
    }

    async fn handle_pressure(&self, snapshot: &Snapshot) -> Option<PassReport> {
        let pressure: PressureReading = snapshot.pressure;
        let below_free_floor =
            snapshot.system.total > 0 && snapshot.system.free < self.config.min_free_memory;

        let cooling_down = self.cooling_down();
        let actions = if cooling_down {
            Vec::new()
        } else {
            plan_actions(&PlanInputs {
                heap_pressure: pressure.heap,
                system_pressure: pressure.system,
                fragmentation: snapshot.fragmentation,
                below_free_floor,
                pressure_threshold: self.config.memory_pressure_threshold,
                fragmentation_threshold: self.config.heap_fragmentation_threshold,
            })
        };

        warn!(
            level = %pressure.level(),
            overall = pressure.overall,
            heap = pressure.heap,
            system = pressure.system,
            external = pressure.external,
            actions = ?actions,
            cooling_down,
            "Memory pressure detected"
        );
        self.events.publish(MonitorEvent::MemoryPressure {
            pressure,
            level: pressure.level(),
            actions: actions.clone(),
        });

        if cooling_down {
            return None;
        }

        *self.last_remediation.lock() = Some(Instant::now());
        self.counters.record_pressure_pass();
        let report = self.dispatcher.run(&actions, &self.cancel.guard()).await;
        self.dispatcher.finish_pass();
        Some(report)
    }

    /// Re-evaluate collection need from the recent heap trend
    pub async fn gc_optimization_tick(&self) -> GcAdvice {
        if !self.is_running() {
            return GcAdvice::default();
        }

        let window = self.history.recent(GC_TREND_WINDOW);
        let advice = advise_gc(&window, self.config.heap_fragmentation_threshold);

        let mut actions: Vec<RemediationAction> = advice.collection.into_iter().collect();
        if advice.compaction && self.config.enable_heap_optimization {
            actions.push(RemediationAction::HeapCompaction);
        }

        if !actions.is_empty() {
            debug!(actions = ?actions, "Trend-driven collection");
            self.dispatcher.run(&actions, &self.cancel.guard()).await;
        }
        self.pools.predictive_prewarm();
        advice
    }

    /// Look for sustained growth and register new suspects
    pub fn leak_detection_tick(&self) -> Vec<LeakSuspect> {
        if !self.is_running() {
            return Vec::new();
        }

        let now = now_ms();
        let evicted = self.leaks.evict_expired(now);
        if evicted > 0 {
            debug!(evicted, "Expired leak suspects removed");
        }

        let window = self.history.recent(LEAK_TREND_WINDOW);
        let suspects: Vec<LeakSuspect> = leak::detect(&window, self.config.leak_detection_threshold)
            .into_iter()
            .map(|finding| self.leaks.insert(finding, now))
            .collect();

        if !suspects.is_empty() {
            self.counters.record_leaks(suspects.len() as u64);
        }
        for suspect in &suspects {
            warn!(
                id = %suspect.id,
                kind = ?suspect.kind,
                severity = ?suspect.severity,
                slope = suspect.trend.slope,
                "Potential memory leak detected"
            );
            self.events.publish(MonitorEvent::MemoryLeakDetected {
                suspect: suspect.clone(),
            });
        }
        suspects
    }

    /// Compact or defragment from the latest fragmentation reading
    pub async fn heap_optimization_tick(&self) -> Option<RemediationAction> {
        if !self.is_running() {
            return None;
        }

        let fragmentation = self.history.latest()?.fragmentation;
        let action = advise_heap(fragmentation, self.config.heap_fragmentation_threshold)?;
        debug!(fragmentation, action = %action, "Heap optimization");
        self.dispatcher.run(&[action], &self.cancel.guard()).await;
        Some(action)
    }

    /// Run a manual optimization now, running or not
    pub async fn optimize_now(&self, options: OptimizeOptions) -> OptimizationReport {
        let start = Instant::now();
        let pass = self
            .dispatcher
            .run(&options.actions(), &self.cancel.guard())
            .await;
        let report = OptimizationReport::from_pass(pass, duration_ms(start.elapsed()));

        self.counters.record_manual_optimization();
        info!(
            duration_ms = report.duration_ms,
            memory_freed = report.memory_freed,
            actions = ?report.actions,
            "Manual optimization completed"
        );
        self.events.publish(MonitorEvent::ManualOptimization {
            report: report.clone(),
        });
        report
    }

    fn health_inputs(&self) -> HealthInputs {
        let latest = self.history.latest();
        HealthInputs {
            overall_pressure: latest.as_ref().map(|s| s.pressure.overall).unwrap_or(0.0),
            fragmentation: latest.as_ref().map(|s| s.fragmentation).unwrap_or(0.0),
            active_leaks: self.leaks.len(),
            average_collection_ms: self.history.collection_stats().average_duration_ms,
            pool_efficiency: self.pools.mean_efficiency(),
        }
    }

    pub fn health_score(&self) -> f64 {
        health_score(&self.health_inputs())
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        let current = self.history.latest();
        MetricsSnapshot {
            timestamp_ms: now_ms(),
            uptime_ms: self.uptime_ms(),
            running: self.is_running(),
            pressure: current.as_ref().map(|s| s.pressure).unwrap_or_default(),
            fragmentation: current.as_ref().map(|s| s.fragmentation).unwrap_or(0.0),
            current,
            collection_history: self.history.collections(),
            collection_stats: self.history.collection_stats(),
            leaks: self.leaks.active(),
            pools: self.pools.stats(),
            optimizations: self.counters.snapshot(),
            capabilities: self.capabilities(),
            events: self.events.stats(),
            health_score: self.health_score(),
        }
    }
}
