/*!
 * Memory Orchestrator Library
 * Adaptive memory-pressure monitoring and collection orchestration
 */

pub mod config;
pub mod core;
pub mod memory;
pub mod monitoring;
pub mod orchestrator;

// Re-exports
pub use config::{LogLevel, MonitorConfig, PoolSizes};
pub use crate::core::{MonitorError, MonitorResult};
pub use memory::{
    Capabilities, Capability, HeapRuntime, MemoryPressure, MemoryReading, MemorySource,
    PoolObject, RemediationAction, SizeClass,
};
pub use monitoring::{
    init_tracing, LeakSuspect, MetricsSnapshot, MonitorEvent, PressureReading, Snapshot,
};
pub use orchestrator::{
    MemoryOrchestrator, MemoryOrchestratorBuilder, MonitorTask, OptimizationReport,
    OptimizeOptions,
};
