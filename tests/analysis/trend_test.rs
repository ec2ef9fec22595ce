/*!
 * Trend Tests
 * Regression properties and the collection advisor
 */

use memory_orchestrator::memory::{MemoryReading, ProcessMemory, RemediationAction, SystemMemory};
use memory_orchestrator::monitoring::{advise_gc, advise_heap, Snapshot, Trend, TrendDirection};
use proptest::prelude::*;
use std::sync::Arc;

const MIB: u64 = 1024 * 1024;

fn snapshot(heap_used_mib: u64, heap_total_mib: u64) -> Arc<Snapshot> {
    let reading = MemoryReading {
        process: ProcessMemory {
            heap_used: heap_used_mib * MIB,
            heap_total: heap_total_mib * MIB,
            external: 0,
            rss: heap_used_mib * MIB,
        },
        heap: None,
        system: SystemMemory::from_total_free(64 * 1024 * MIB, 60 * 1024 * MIB),
    };
    Arc::new(Snapshot::from_reading(reading, 0))
}

#[test]
fn test_flat_series_is_stable() {
    let trend = Trend::fit(&[5.0; 12]).unwrap();
    assert_eq!(trend.direction, TrendDirection::Stable);
    assert_eq!(trend.correlation, 0.0);
    assert_eq!(trend.current, 5.0);
}

#[test]
fn test_too_short_series_has_no_trend() {
    assert!(Trend::fit(&[]).is_none());
    assert!(Trend::fit(&[1.0]).is_none());
}

#[test]
fn test_steady_growth_recommends_incremental() {
    let window: Vec<_> = (0..10).map(|i| snapshot(100 + i, 10_000)).collect();
    let advice = advise_gc(&window, 0.3);

    assert_eq!(advice.collection, Some(RemediationAction::GcIncremental));
    assert!(!advice.compaction);
    let trend = advice.heap_trend.unwrap();
    assert!((trend.slope - 1.0).abs() < 1e-9);
}

#[test]
fn test_high_pressure_recommends_full() {
    let mut window: Vec<_> = (0..10).map(|_| snapshot(99, 100)).collect();
    // Latest reading also has system and external memory over the line
    let reading = MemoryReading {
        process: ProcessMemory {
            heap_used: 99 * MIB,
            heap_total: 100 * MIB,
            external: 20 * MIB,
            rss: 119 * MIB,
        },
        heap: None,
        system: SystemMemory::from_total_free(1000 * MIB, 100 * MIB),
    };
    window.push(Arc::new(Snapshot::from_reading(reading, 0)));

    let advice = advise_gc(&window, 0.3);
    assert_eq!(advice.collection, Some(RemediationAction::GcFull));
}

#[test]
fn test_empty_window_gives_no_advice() {
    assert!(advise_gc(&[], 0.3).is_empty());
}

#[test]
fn test_heap_advice_bands() {
    assert_eq!(advise_heap(0.5, 0.3), Some(RemediationAction::Defragmentation));
    assert_eq!(advise_heap(0.2, 0.3), Some(RemediationAction::HeapCompaction));
    assert_eq!(advise_heap(0.1, 0.3), None);
}

proptest! {
    #[test]
    fn prop_strictly_increasing_series_trends_up(
        start in 0.0f64..1000.0,
        steps in prop::collection::vec(0.01f64..50.0, 2..60),
    ) {
        let mut value = start;
        let mut series = vec![value];
        for step in steps {
            value += step;
            series.push(value);
        }

        let trend = Trend::fit(&series).unwrap();
        prop_assert!(trend.slope > 0.0);
        prop_assert!(trend.correlation > 0.0);
        prop_assert_eq!(trend.direction, TrendDirection::Increasing);
        prop_assert_eq!(trend.current, value);
    }

    #[test]
    fn prop_correlation_is_bounded(series in prop::collection::vec(-1e6f64..1e6, 2..100)) {
        let trend = Trend::fit(&series).unwrap();
        prop_assert!((-1.0..=1.0).contains(&trend.correlation));
    }
}
