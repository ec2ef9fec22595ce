/*!
 * Scheduler Task
 *
 * One supervising background task drives the four monitor cadences with
 * per-task due times. Ticks run inline, so a slow remediation pass delays
 * later ticks instead of overlapping them.
 */

use super::state::MonitorState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Sub-tasks dispatched by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonitorTask {
    Monitoring,
    GcOptimization,
    LeakDetection,
    HeapOptimization,
}

impl MonitorTask {
    pub const ALL: [MonitorTask; 4] = [
        MonitorTask::Monitoring,
        MonitorTask::GcOptimization,
        MonitorTask::LeakDetection,
        MonitorTask::HeapOptimization,
    ];
}

/// Control messages for the scheduler task
#[derive(Debug, Clone)]
pub enum SchedulerCommand {
    /// Run a sub-task now; its cadence restarts from here
    Trigger(MonitorTask),
    /// Shutdown the scheduler task
    Shutdown,
}

/// Enabled sub-task with its cadence
#[derive(Debug, Clone, Copy)]
struct Slot {
    task: MonitorTask,
    interval: Duration,
    next_due: Instant,
}

/// Handle to the scheduler background task
pub struct SchedulerTask {
    command_tx: mpsc::UnboundedSender<SchedulerCommand>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl SchedulerTask {
    /// Spawn the scheduler for every enabled sub-task
    pub fn spawn(state: Arc<MonitorState>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let slots = slots_for(&state);
        let names: Vec<MonitorTask> = slots.iter().map(|slot| slot.task).collect();

        let handle = tokio::spawn(async move {
            run_scheduler_loop(state, slots, command_rx).await;
        });

        info!(tasks = ?names, "Monitor scheduler spawned");

        Self {
            command_tx,
            handle: Some(handle),
        }
    }

    pub fn trigger(&self, task: MonitorTask) {
        let _ = self.command_tx.send(SchedulerCommand::Trigger(task));
    }

    /// Shutdown the scheduler task and wait for it
    pub async fn shutdown(mut self) {
        let _ = self.command_tx.send(SchedulerCommand::Shutdown);

        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Scheduler task shutdown error");
            } else {
                debug!("Scheduler task shutdown complete");
            }
        }
    }
}

impl Drop for SchedulerTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            let _ = self.command_tx.send(SchedulerCommand::Shutdown);
        }
    }
}

fn slots_for(state: &MonitorState) -> Vec<Slot> {
    let config = state.config();
    let now = Instant::now();

    MonitorTask::ALL
        .iter()
        .filter_map(|&task| {
            let (enabled, interval) = match task {
                MonitorTask::Monitoring => (true, config.monitoring_interval),
                MonitorTask::GcOptimization => {
                    (config.enable_smart_gc, config.gc_optimization_interval)
                }
                MonitorTask::LeakDetection => {
                    (config.enable_leak_detection, config.leak_detection_interval)
                }
                MonitorTask::HeapOptimization => (
                    config.enable_heap_optimization,
                    config.heap_optimization_interval,
                ),
            };
            enabled.then_some(Slot {
                task,
                interval,
                next_due: now + interval,
            })
        })
        .collect()
}

async fn run_task(state: &MonitorState, task: MonitorTask) {
    match task {
        MonitorTask::Monitoring => {
            state.monitor_tick().await;
        }
        MonitorTask::GcOptimization => {
            state.gc_optimization_tick().await;
        }
        MonitorTask::LeakDetection => {
            state.leak_detection_tick();
        }
        MonitorTask::HeapOptimization => {
            state.heap_optimization_tick().await;
        }
    }
}

/// Core loop: sleep until the earliest due slot, run what is due, repeat
async fn run_scheduler_loop(
    state: Arc<MonitorState>,
    mut slots: Vec<Slot>,
    mut command_rx: mpsc::UnboundedReceiver<SchedulerCommand>,
) {
    loop {
        let next_due = slots
            .iter()
            .map(|slot| slot.next_due)
            .min()
            .unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        tokio::select! {
            _ = tokio::time::sleep_until(next_due) => {
                let now = Instant::now();
                for slot in slots.iter_mut() {
                    if slot.next_due <= now {
                        run_task(&state, slot.task).await;
                        // Skip missed ticks rather than bursting to catch up
                        slot.next_due = Instant::now() + slot.interval;
                    }
                }
            }

            cmd = command_rx.recv() => {
                match cmd {
                    Some(SchedulerCommand::Trigger(task)) => {
                        debug!(task = ?task, "Manual scheduler trigger");
                        run_task(&state, task).await;
                        if let Some(slot) = slots.iter_mut().find(|slot| slot.task == task) {
                            slot.next_due = Instant::now() + slot.interval;
                        }
                    }
                    Some(SchedulerCommand::Shutdown) | None => {
                        debug!("Scheduler task shutting down");
                        break;
                    }
                }
            }
        }
    }
}
