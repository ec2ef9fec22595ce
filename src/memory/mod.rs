/*!
 * Memory Module
 * Runtime hooks, memory readings, collection and object pools
 */

pub mod gc;
pub mod pool;
pub mod runtime;
pub mod source;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use gc::{
    plan_actions, ActionFailureReport, Collector, Dispatcher, GcStats, PassReport, PlanInputs,
    RemediationAction,
};
pub use pool::{
    Pool, PoolAdjustment, PoolManager, PoolManagerStats, PoolObject, PoolStats, SizeClass,
};
pub use runtime::{default_runtime, NoRuntime};
pub use source::SystemMemorySource;
pub use traits::*;
pub use types::*;
