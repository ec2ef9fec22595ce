/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use crate::memory::Capability;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used throughout the monitor
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Monitor errors
///
/// None of these cross the public orchestrator API except `InvalidConfig`,
/// which is only returned while building a monitor. Everything raised while
/// monitoring is logged and, where it matters, reported as an event.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum MonitorError {
    #[error("Runtime capability unavailable: {0}")]
    #[diagnostic(
        code(monitor::missing_capability),
        help("The hosting runtime does not expose this hook. The action is skipped.")
    )]
    MissingCapability(Capability),

    #[error("Unknown remediation action: {0}")]
    #[diagnostic(
        code(monitor::unknown_action),
        help("Valid actions: gc_full, gc_incremental, heap_compaction, emergency_cleanup, memory_pool_cleanup, defragmentation")
    )]
    UnknownAction(String),

    #[error("Remediation action {action} failed: {reason}")]
    #[diagnostic(
        code(monitor::action_failure),
        help("The remaining actions of the pass still run. Check runtime logs for the cause.")
    )]
    ActionFailure { action: String, reason: String },

    #[error("Collection observer unavailable: {0}")]
    #[diagnostic(
        code(monitor::observer_unavailable),
        help("gc-event notifications are disabled; polling metrics keep working.")
    )]
    ObserverUnavailable(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(monitor::invalid_config),
        help("Check threshold ranges (0, 1] and that intervals and pool sizes are non-zero.")
    )]
    InvalidConfig(String),
}

impl MonitorError {
    /// Build an action failure from any displayable cause
    pub fn action_failure(action: impl std::fmt::Display, reason: impl std::fmt::Display) -> Self {
        MonitorError::ActionFailure {
            action: action.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(reason: impl Into<String>) -> Self {
        MonitorError::InvalidConfig(reason.into())
    }

    /// Missing capabilities are expected on plain runtimes and never fatal
    pub fn is_missing_capability(&self) -> bool {
        matches!(self, MonitorError::MissingCapability(_))
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        MonitorError::InvalidConfig(err.to_string())
    }
}
