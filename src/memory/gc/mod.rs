/*!
 * Garbage Collection
 * Collection front-end, remediation actions and their dispatcher
 */

pub mod actions;
pub mod collector;
pub mod dispatcher;

pub use actions::{plan_actions, PlanInputs, RemediationAction};
pub use collector::{Collector, GcStats};
pub use dispatcher::{ActionFailureReport, Dispatcher, PassReport};
