/*!
 * Pressure Tests
 * Monitoring ticks, pressure passes, cooldown and the stop guarantee
 */

use super::host::{drain, manual_config, orchestrator, ScriptedHost, MIB};
use memory_orchestrator::memory::{CollectionKind, ObservedCollection};
use memory_orchestrator::monitoring::CollectionTrigger;
use memory_orchestrator::{MemoryPressure, MonitorConfig, MonitorEvent, RemediationAction};
use pretty_assertions::assert_eq;
use std::time::Duration;

/// Heap climbing from 50 to 95 MiB of 100 MiB, host nearly full
fn climbing_heap(step: u64) -> u64 {
    50 * MIB + step * (45 * MIB) / 19
}

#[tokio::test]
async fn test_rising_heap_triggers_full_collection() {
    let host = ScriptedHost::new();
    host.set_system_free(50 * MIB);
    host.set_external(10 * MIB);
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();

    assert!(orchestrator.start());
    for step in 0..20 {
        host.set_heap_used(climbing_heap(step));
        let snapshot = orchestrator.monitor_tick().await.unwrap();
        assert_eq!(snapshot.process.heap_used, climbing_heap(step));
    }

    let events = drain(&mut rx);
    let heavy_pass = events.iter().find_map(|event| match event {
        MonitorEvent::MemoryPressure {
            pressure, actions, ..
        } if pressure.heap > 0.85 => Some(actions.clone()),
        _ => None,
    });
    let actions = heavy_pass.expect("no pressure pass with heap over 0.85");
    assert_eq!(
        actions,
        vec![
            RemediationAction::GcFull,
            RemediationAction::HeapCompaction,
            RemediationAction::EmergencyCleanup,
            RemediationAction::MemoryPoolCleanup,
        ]
    );

    let freed: Vec<u64> = events
        .iter()
        .filter_map(|event| match event {
            MonitorEvent::GcCompleted {
                action: RemediationAction::GcFull,
                memory_freed,
                ..
            } => Some(*memory_freed),
            _ => None,
        })
        .collect();
    assert!(!freed.is_empty());
    assert!(freed.iter().all(|&bytes| bytes == MIB));

    let metrics = orchestrator.metrics();
    assert!(metrics.collection_history.iter().any(|event| {
        event.action_type == CollectionTrigger::Action(RemediationAction::GcFull)
            && event.kind == CollectionKind::Full
    }));
    assert!(metrics.optimizations.pressure_passes > 0);
    assert!(metrics.optimizations.emergency_cleanups > 0);
    assert!(host.collects() > 0);

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_calm_tick_publishes_only_snapshot() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());

    orchestrator.start();
    let mut rx = orchestrator.subscribe();
    orchestrator.monitor_tick().await.unwrap();

    let names: Vec<&str> = drain(&mut rx).iter().map(|event| event.name()).collect();
    assert_eq!(names, vec!["memory-monitored"]);
    assert_eq!(host.collects(), 0);

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_cooldown_suppresses_back_to_back_passes() {
    let host = ScriptedHost::new();
    host.set_system_free(50 * MIB);
    host.set_external(10 * MIB);
    let config = MonitorConfig {
        remediation_cooldown: Duration::from_secs(3600),
        ..manual_config()
    };
    let orchestrator = orchestrator(&host, config);
    let mut rx = orchestrator.subscribe();

    orchestrator.start();
    host.set_heap_used(95 * MIB);
    orchestrator.monitor_tick().await.unwrap();
    let after_first = host.collects();
    assert!(after_first > 0);

    host.set_heap_used(95 * MIB);
    orchestrator.monitor_tick().await.unwrap();
    assert_eq!(host.collects(), after_first);

    let planned: Vec<Vec<RemediationAction>> = drain(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            MonitorEvent::MemoryPressure { actions, level, .. } => {
                assert!(level >= MemoryPressure::High);
                Some(actions)
            }
            _ => None,
        })
        .collect();
    assert_eq!(planned.len(), 2);
    assert!(!planned[0].is_empty());
    assert!(planned[1].is_empty());

    orchestrator.stop().await;
}

#[tokio::test]
async fn test_free_memory_floor_forces_emergency_cleanup() {
    let host = ScriptedHost::new();
    // System pressure 0.85, below the emergency ratio on its own
    host.set_system_free(150 * MIB);
    host.set_external(10 * MIB);
    host.set_heap_used(99 * MIB);

    let plan_for = |min_free_memory: u64| {
        let host = host.clone();
        async move {
            let config = MonitorConfig {
                min_free_memory,
                ..manual_config()
            };
            let orchestrator = orchestrator(&host, config);
            let mut rx = orchestrator.subscribe();
            orchestrator.start();
            host.set_heap_used(99 * MIB);
            orchestrator.monitor_tick().await.unwrap();
            orchestrator.stop().await;
            drain(&mut rx).into_iter().find_map(|event| match event {
                MonitorEvent::MemoryPressure { actions, .. } => Some(actions),
                _ => None,
            })
        }
    };

    let without_floor = plan_for(0).await.unwrap();
    assert!(!without_floor.contains(&RemediationAction::EmergencyCleanup));

    let with_floor = plan_for(200 * MIB).await.unwrap();
    assert!(with_floor.contains(&RemediationAction::EmergencyCleanup));
    assert!(with_floor.contains(&RemediationAction::MemoryPoolCleanup));
}

#[tokio::test]
async fn test_no_monitoring_after_stop() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();

    orchestrator.start();
    orchestrator.monitor_tick().await.unwrap();
    assert!(orchestrator.stop().await);

    assert!(orchestrator.monitor_tick().await.is_none());
    assert!(orchestrator.gc_optimization_tick().await.is_empty());
    assert!(orchestrator.heap_optimization_tick().await.is_none());

    let events = drain(&mut rx);
    let stopped_at = events
        .iter()
        .position(|event| matches!(event, MonitorEvent::Stopped { .. }))
        .unwrap();
    assert!(events[stopped_at + 1..]
        .iter()
        .all(|event| !matches!(event, MonitorEvent::MemoryMonitored { .. })));
    assert!(!orchestrator.metrics().running);
}

#[tokio::test]
async fn test_observed_collections_are_recorded_while_running() {
    let host = ScriptedHost::new();
    let orchestrator = orchestrator(&host, manual_config());
    let mut rx = orchestrator.subscribe();

    orchestrator.start();
    let observed = ObservedCollection {
        kind: CollectionKind::Minor,
        duration: Duration::from_millis(3),
    };
    assert!(host.fire_observer(observed));

    let history = orchestrator.metrics().collection_history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].action_type, CollectionTrigger::Observed);
    assert_eq!(history[0].memory_freed, 0);
    assert!(drain(&mut rx).iter().any(|event| matches!(
        event,
        MonitorEvent::GcEvent {
            kind: CollectionKind::Minor,
            duration_ms: 3
        }
    )));

    orchestrator.stop().await;
    host.fire_observer(observed);
    assert_eq!(orchestrator.metrics().collection_history.len(), 1);
}
