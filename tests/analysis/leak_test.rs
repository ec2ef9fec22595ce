/*!
 * Leak Detection Tests
 * Classification boundaries, window requirements and registry expiry
 */

use memory_orchestrator::memory::{MemoryReading, ProcessMemory, SystemMemory};
use memory_orchestrator::monitoring::leak::{classify, detect};
use memory_orchestrator::monitoring::{
    LeakKind, LeakRegistry, LeakSeverity, Snapshot, Trend, TrendDirection,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const MIB: u64 = 1024 * 1024;
const DAY_MS: u64 = 24 * 60 * 60 * 1000;

fn trend(slope: f64, correlation: f64) -> Trend {
    Trend {
        slope,
        intercept: 0.0,
        correlation,
        current: 100.0,
        direction: TrendDirection::Increasing,
    }
}

fn window(heap_mib: impl Fn(u64) -> u64, external_mib: impl Fn(u64) -> u64, len: u64) -> Vec<Arc<Snapshot>> {
    (0..len)
        .map(|i| {
            let reading = MemoryReading {
                process: ProcessMemory {
                    heap_used: heap_mib(i) * MIB,
                    heap_total: 4096 * MIB,
                    external: external_mib(i) * MIB,
                    rss: (heap_mib(i) + external_mib(i)) * MIB,
                },
                heap: None,
                system: SystemMemory::from_total_free(64 * 1024 * MIB, 32 * 1024 * MIB),
            };
            Arc::new(Snapshot::from_reading(reading, i * 1000))
        })
        .collect()
}

#[test]
fn test_heap_slope_at_threshold_is_medium() {
    let findings = classify(Some(&trend(0.1, 0.95)), None, 0.1);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, LeakKind::HeapGrowth);
    assert_eq!(findings[0].severity, LeakSeverity::Medium);
}

#[test]
fn test_heap_slope_past_escalation_is_high() {
    let findings = classify(Some(&trend(0.51, 0.95)), None, 0.1);
    assert_eq!(findings[0].severity, LeakSeverity::High);

    // Exactly five times the threshold stays medium
    let findings = classify(Some(&trend(0.5, 0.95)), None, 0.1);
    assert_eq!(findings[0].severity, LeakSeverity::Medium);
}

#[test]
fn test_noisy_heap_growth_is_ignored() {
    assert!(classify(Some(&trend(1.0, 0.8)), None, 0.1).is_empty());
    assert!(classify(Some(&trend(0.099, 0.99)), None, 0.1).is_empty());
}

#[test]
fn test_external_growth_boundary() {
    assert!(classify(None, Some(&trend(0.05, 1.0)), 0.1).is_empty());

    let findings = classify(None, Some(&trend(0.051, 0.1)), 0.1);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, LeakKind::ExternalGrowth);
    assert_eq!(findings[0].severity, LeakSeverity::Low);
}

#[test]
fn test_detect_needs_ten_samples() {
    let short = window(|i| 100 + 10 * i, |_| 0, 9);
    assert!(detect(&short, 0.1).is_empty());

    let enough = window(|i| 100 + 10 * i, |_| 0, 10);
    let findings = detect(&enough, 0.1);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, LeakKind::HeapGrowth);
    assert_eq!(findings[0].severity, LeakSeverity::High);
}

#[test]
fn test_detect_flags_both_series() {
    let snapshots = window(|i| 100 + i, |i| 10 + i, 30);
    let kinds: Vec<LeakKind> = detect(&snapshots, 0.1).into_iter().map(|f| f.kind).collect();
    assert_eq!(kinds, vec![LeakKind::HeapGrowth, LeakKind::ExternalGrowth]);
}

#[test]
fn test_stable_memory_has_no_suspects() {
    let snapshots = window(|_| 200, |_| 20, 30);
    assert!(detect(&snapshots, 0.1).is_empty());
}

#[test]
fn test_registry_expires_after_a_day() {
    let registry = LeakRegistry::new();
    let finding = classify(Some(&trend(1.0, 0.99)), None, 0.1).remove(0);

    let old = registry.insert(finding.clone(), 1_000);
    let fresh = registry.insert(finding, 1_000 + DAY_MS);
    assert_ne!(old.id, fresh.id);
    assert_eq!(registry.len(), 2);

    // Exactly 24h old is still kept
    assert_eq!(registry.evict_expired(1_000 + DAY_MS), 0);
    assert_eq!(registry.evict_expired(1_001 + DAY_MS), 1);

    assert!(registry.get(&old.id).is_none());
    assert_eq!(registry.get(&fresh.id), Some(fresh.clone()));
    assert_eq!(registry.active(), vec![fresh]);

    registry.clear();
    assert!(registry.is_empty());
}
