/*!
 * Orchestrator
 * Lifecycle, cadence scheduling and the public monitor handle
 */

mod builder;
mod manager;
mod optimize;
mod scheduler_task;
mod state;

pub use builder::MemoryOrchestratorBuilder;
pub use manager::MemoryOrchestrator;
pub use optimize::{OptimizationReport, OptimizeOptions};
pub use scheduler_task::MonitorTask;
