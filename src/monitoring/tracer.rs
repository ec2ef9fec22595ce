/*!
 * Tracing
 * Subscriber setup and per-action spans
 *
 * Features:
 * - `RUST_LOG` overrides the configured level
 * - JSON output via `MEMORY_TRACE_JSON`
 * - `log` records (pool internals) are bridged into the same subscriber
 */

use crate::config::LogLevel;
use crate::memory::RemediationAction;
use std::time::{Duration, Instant};
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Actions slower than this are logged at warn on completion
const SLOW_ACTION: Duration = Duration::from_millis(100);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: filter directives (default: the configured `log_level`)
/// - MEMORY_TRACE_JSON: JSON output when "1" or "true"
///
/// Returns false when a global subscriber was already installed.
pub fn init_tracing(level: LogLevel) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    let use_json = std::env::var("MEMORY_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(json = use_json, level = %level, "Tracing initialized");
    }
    installed
}

/// Span covering one remediation action
pub struct ActionSpan {
    span: Span,
    start: Instant,
    action: RemediationAction,
    trace_id: String,
}

impl ActionSpan {
    pub fn new(action: RemediationAction) -> Self {
        let trace_id = Uuid::new_v4().to_string();
        let span = span!(
            Level::DEBUG,
            "remediation",
            trace_id = %trace_id,
            action = action.name(),
            duration_ms = tracing::field::Empty,
            result = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            action,
            trace_id,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Span to instrument the action future with
    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ActionSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_ms", duration.as_millis() as u64);
        let _entered = self.span.enter();

        if duration > SLOW_ACTION {
            warn!(
                trace_id = %self.trace_id,
                action = %self.action,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow remediation action"
            );
        } else {
            debug!(
                trace_id = %self.trace_id,
                action = %self.action,
                duration_us = duration.as_micros() as u64,
                "remediation action completed"
            );
        }
    }
}
