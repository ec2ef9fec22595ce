/*!
 * Cadence Tests
 * GC-optimization, leak-detection and heap-optimization ticks, plus the scheduler
 */

use super::host::{drain, manual_config, orchestrator, ScriptedHost, MIB};
use memory_orchestrator::memory::HeapStatistics;
use memory_orchestrator::monitoring::{LeakKind, LeakSeverity};
use memory_orchestrator::{MonitorConfig, MonitorEvent, MonitorTask, RemediationAction};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::time::timeout;

fn fragmented(used: u64, total: u64) -> Option<HeapStatistics> {
    Some(HeapStatistics {
        total_heap_size: total,
        used_heap_size: used,
        heap_size_limit: total,
        total_available_size: total - used,
        malloced_memory: 0,
    })
}

#[tokio::test]
async fn test_leak_detection_flags_steady_heap_growth() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();

    orchestrator.start();
    // Too few samples yet
    assert!(orchestrator.leak_detection_tick().is_empty());

    for step in 0..15 {
        host.set_heap_used(10 * MIB + step * MIB);
        orchestrator.monitor_tick().await.unwrap();
    }

    let suspects = orchestrator.leak_detection_tick();
    assert_eq!(suspects.len(), 1);
    assert_eq!(suspects[0].kind, LeakKind::HeapGrowth);
    assert_eq!(suspects[0].severity, LeakSeverity::High);
    assert!((suspects[0].trend.slope - 1.0).abs() < 0.1);

    assert_eq!(orchestrator.leak_suspects().len(), 1);
    assert!(drain(&mut rx)
        .iter()
        .any(|event| matches!(event, MonitorEvent::MemoryLeakDetected { .. })));

    let metrics = orchestrator.metrics();
    assert_eq!(metrics.optimizations.leaks_detected, 1);
    assert!(metrics.health_score < 100.0);

    orchestrator.clear_leak_suspects();
    assert!(orchestrator.leak_suspects().is_empty());
    orchestrator.stop().await;
}

#[tokio::test]
async fn test_external_growth_is_low_severity() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());

    orchestrator.start();
    for step in 0..12 {
        host.set_external(step * MIB);
        orchestrator.monitor_tick().await.unwrap();
    }

    let suspects = orchestrator.leak_detection_tick();
    assert_eq!(suspects.len(), 1);
    assert_eq!(suspects[0].kind, LeakKind::ExternalGrowth);
    assert_eq!(suspects[0].severity, LeakSeverity::Low);
    orchestrator.stop().await;
}

#[tokio::test]
async fn test_gc_optimization_runs_incremental_on_growth() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());

    orchestrator.start();
    for step in 0..10 {
        host.set_heap_used(10 * MIB + step * MIB);
        orchestrator.monitor_tick().await.unwrap();
    }

    let advice = orchestrator.gc_optimization_tick().await;
    assert_eq!(advice.collection, Some(RemediationAction::GcIncremental));
    assert!(!advice.compaction);
    // Incremental collection runs ten short bursts
    assert_eq!(host.collects(), 10);
    assert_eq!(orchestrator.metrics().optimizations.incremental_runs, 1);

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_gc_optimization_idle_heap_does_nothing() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());

    orchestrator.start();
    for _ in 0..10 {
        orchestrator.monitor_tick().await.unwrap();
    }
    assert!(orchestrator.gc_optimization_tick().await.is_empty());
    assert_eq!(host.collects(), 0);
    orchestrator.stop().await;
}

#[tokio::test]
async fn test_heap_optimization_picks_step_from_fragmentation() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();
    orchestrator.start();

    // 50% fragmented, over the 0.3 threshold
    host.set_heap_statistics(fragmented(50 * MIB, 100 * MIB));
    orchestrator.monitor_tick().await.unwrap();
    assert_eq!(
        orchestrator.heap_optimization_tick().await,
        Some(RemediationAction::Defragmentation)
    );
    assert!(drain(&mut rx)
        .iter()
        .any(|event| matches!(event, MonitorEvent::DefragmentationCompleted { .. })));

    // 20% fragmented, between half the threshold and the threshold
    host.set_heap_statistics(fragmented(80 * MIB, 100 * MIB));
    orchestrator.monitor_tick().await.unwrap();
    assert_eq!(
        orchestrator.heap_optimization_tick().await,
        Some(RemediationAction::HeapCompaction)
    );

    // 5% fragmented
    host.set_heap_statistics(fragmented(95 * MIB, 100 * MIB));
    orchestrator.monitor_tick().await.unwrap();
    assert_eq!(orchestrator.heap_optimization_tick().await, None);

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_trigger_runs_task_through_scheduler() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();

    assert!(!orchestrator.trigger(MonitorTask::Monitoring));
    orchestrator.start();
    assert!(orchestrator.trigger(MonitorTask::Monitoring));

    let monitored = timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(MonitorEvent::MemoryMonitored { snapshot }) => break snapshot,
                Ok(_) => continue,
                Err(e) => panic!("event stream failed: {}", e),
            }
        }
    })
    .await
    .expect("triggered tick never ran");
    assert_eq!(monitored.process.heap_used, 10 * MIB);

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_scheduler_runs_monitoring_cadence() {
    let host = ScriptedHost::new();
    let config = MonitorConfig {
        monitoring_interval: Duration::from_millis(20),
        ..manual_config()
    };
    let orchestrator = orchestrator(&host, config);
    let mut rx = orchestrator.subscribe();

    orchestrator.start();
    let mut ticks = 0;
    timeout(Duration::from_secs(5), async {
        while ticks < 3 {
            if let Ok(MonitorEvent::MemoryMonitored { .. }) = rx.recv().await {
                ticks += 1;
            }
        }
    })
    .await
    .expect("monitoring cadence stalled");

    assert!(orchestrator.stop().await);
    assert_eq!(ticks, 3);
}
