/*!
 * Memory Orchestrator - Main Entry Point
 *
 * Runs the monitor against the current process:
 * - Configuration from MEMORY_* environment variables
 * - Structured logging of every monitor event
 * - Periodic health summary until Ctrl+C
 */

use anyhow::Context;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use memory_orchestrator::{init_tracing, MemoryOrchestrator, MonitorConfig, MonitorEvent};

#[cfg(all(feature = "jemalloc", not(target_env = "msvc")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

const HEALTH_REPORT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = MonitorConfig::from_env().context("invalid memory monitor configuration")?;
    init_tracing(config.log_level);

    info!("Memory orchestrator starting...");
    info!("================================================");

    let orchestrator = MemoryOrchestrator::new(config).context("failed to build orchestrator")?;
    let capabilities = orchestrator.metrics().capabilities;
    info!(
        collector = capabilities.collector,
        heap_introspection = capabilities.heap_introspection,
        collection_observer = capabilities.collection_observer,
        "Runtime capabilities detected"
    );

    let mut events = orchestrator.subscribe();
    let event_logger = tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event logger lagged behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    if !orchestrator.start() {
        anyhow::bail!("memory monitor did not start");
    }

    info!("Press Ctrl+C to exit");

    let mut health_interval = tokio::time::interval(HEALTH_REPORT_INTERVAL);
    health_interval.tick().await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    error!(error = %e, "Failed to listen for Ctrl+C");
                }
                break;
            }
            _ = health_interval.tick() => {
                let metrics = orchestrator.metrics();
                info!(
                    health_score = metrics.health_score,
                    overall_pressure = metrics.pressure.overall,
                    fragmentation = metrics.fragmentation,
                    active_leaks = metrics.leaks.len(),
                    collections = metrics.collection_stats.count,
                    "Health report"
                );
            }
        }
    }

    info!("Shutting down...");
    orchestrator.stop().await;
    drop(orchestrator);
    event_logger.abort();
    info!("Memory orchestrator stopped");
    Ok(())
}

fn log_event(event: &MonitorEvent) {
    match event {
        MonitorEvent::MemoryMonitored { snapshot } => debug!(
            heap_used = snapshot.process.heap_used,
            overall = snapshot.pressure.overall,
            "memory-monitored"
        ),
        MonitorEvent::MemoryLeakDetected { suspect } => warn!(
            id = %suspect.id,
            description = %suspect.description,
            "memory-leak-detected"
        ),
        MonitorEvent::ActionFailed { action, error } => {
            error!(action = %action, error = %error, "action-failed")
        }
        other => match serde_json::to_string(other) {
            Ok(json) => info!(event = other.name(), payload = %json, "monitor event"),
            Err(e) => warn!(event = other.name(), error = %e, "Unserializable monitor event"),
        },
    }
}
