/*!
 * Monitoring
 * Sampling, analysis, leak tracking, health and event distribution
 */

pub mod analysis;
pub mod events;
pub mod health;
pub mod history;
pub mod leak;
pub mod metrics;
pub mod pressure;
pub mod sampler;
pub mod streaming;
mod tracer;

pub use analysis::{advise_gc, advise_heap, GcAdvice, Trend, TrendDirection};
pub use events::{MonitorEvent, Severity};
pub use health::{health_score, HealthInputs};
pub use history::{CollectionEvent, CollectionStats, CollectionTrigger, HistoryStore};
pub use leak::{LeakFinding, LeakKind, LeakRegistry, LeakSeverity, LeakSuspect, LeakTrend};
pub use metrics::{MetricsSnapshot, OptimizationCounters, OptimizationStats};
pub use pressure::PressureReading;
pub use sampler::{Sampler, Snapshot};
pub use streaming::{EventBus, StreamStats};
pub use tracer::{init_tracing, ActionSpan};
