/*!
 * Orchestrator Builder
 * Builder pattern for MemoryOrchestrator construction
 */

use super::manager::MemoryOrchestrator;
use super::state::MonitorState;
use crate::config::MonitorConfig;
use crate::core::MonitorResult;
use crate::memory::{
    default_runtime, Collector, Dispatcher, HeapRuntime, MemorySource, PoolManager,
    SystemMemorySource,
};
use crate::monitoring::{EventBus, HistoryStore, OptimizationCounters, Sampler};
use log::info;
use std::sync::Arc;

/// Builder for MemoryOrchestrator
pub struct MemoryOrchestratorBuilder {
    config: MonitorConfig,
    runtime: Option<Arc<dyn HeapRuntime>>,
    source: Option<Arc<dyn MemorySource>>,
    event_capacity: Option<usize>,
}

impl MemoryOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            config: MonitorConfig::default(),
            runtime: None,
            source: None,
            event_capacity: None,
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Runtime providing collection and heap-introspection hooks
    pub fn with_runtime(mut self, runtime: Arc<dyn HeapRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Replace the sysinfo-backed reading source
    pub fn with_source(mut self, source: Arc<dyn MemorySource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Broadcast buffer per subscriber before lagging receivers skip events
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = Some(capacity);
        self
    }

    /// Validate the configuration and wire the monitor together
    pub fn build(self) -> MonitorResult<MemoryOrchestrator> {
        self.config.validate()?;

        let max_heap_size = self.config.resolved_max_heap_size();

        let runtime = self
            .runtime
            .unwrap_or_else(|| default_runtime(max_heap_size));
        let source = self.source.unwrap_or_else(|| {
            Arc::new(SystemMemorySource::new(Arc::clone(&runtime), max_heap_size))
        });

        let sampler = Sampler::new(source);
        let history = Arc::new(HistoryStore::new());
        let pools = Arc::new(PoolManager::from_config(&self.config));
        let events = self
            .event_capacity
            .map(EventBus::with_capacity)
            .unwrap_or_default();
        let counters = Arc::new(OptimizationCounters::new());

        let dispatcher = Dispatcher::new(
            Collector::new(runtime, sampler.clone()),
            Arc::clone(&pools),
            Arc::clone(&history),
            events.clone(),
            Arc::clone(&counters),
        );

        info!(
            "Memory orchestrator built: threshold={}, interval={:?}, pools={}",
            self.config.memory_pressure_threshold,
            self.config.monitoring_interval,
            self.config.enable_memory_pools
        );

        let state = MonitorState::new(
            self.config,
            sampler,
            history,
            pools,
            dispatcher,
            events,
            counters,
        );
        Ok(MemoryOrchestrator::from_state(Arc::new(state)))
    }
}

impl Default for MemoryOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
