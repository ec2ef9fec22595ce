/*!
 * Pool Tuning Tests
 * Self-tuning, predictive pre-warming and cleanup passes
 */

use memory_orchestrator::config::{MonitorConfig, PoolSizes};
use memory_orchestrator::memory::{PoolAdjustment, PoolManager, SizeClass};
use pretty_assertions::assert_eq;

fn config(max_pool_size: usize, pool_prealloc: usize) -> MonitorConfig {
    MonitorConfig {
        max_pool_size,
        pool_prealloc,
        ..MonitorConfig::default()
    }
}

fn adjustment_for(
    adjustments: &[(SizeClass, PoolAdjustment)],
    class: SizeClass,
) -> PoolAdjustment {
    adjustments
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, adjustment)| *adjustment)
        .unwrap_or(PoolAdjustment::Unchanged)
}

#[test]
fn test_well_recycled_pool_expands() {
    let pools = PoolManager::new(&PoolSizes::default(), 100);

    for _ in 0..10 {
        let obj = pools.allocate(16).unwrap();
        pools.release(obj, 16).unwrap();
    }

    let adjustments = pools.self_tune();
    assert_eq!(
        adjustment_for(&adjustments, SizeClass::Small),
        PoolAdjustment::Expanded(20)
    );
    assert_eq!(
        adjustment_for(&adjustments, SizeClass::Medium),
        PoolAdjustment::Unchanged
    );
    assert_eq!(pools.pool_stats(SizeClass::Small).unwrap().available, 21);
}

#[test]
fn test_idle_leaky_pool_shrinks() {
    let pools = PoolManager::from_config(&config(100, 60));

    let adjustments = pools.self_tune();
    for class in SizeClass::ALL {
        assert_eq!(
            adjustment_for(&adjustments, class),
            PoolAdjustment::Shrunk(10)
        );
        assert_eq!(pools.pool_stats(class).unwrap().available, 50);
    }
}

#[test]
fn test_expansion_respects_capacity() {
    let pools = PoolManager::new(&PoolSizes::default(), 4);

    for _ in 0..5 {
        let obj = pools.allocate(16).unwrap();
        pools.release(obj, 16).unwrap();
    }

    pools.self_tune();
    pools.self_tune();
    let stats = pools.pool_stats(SizeClass::Small).unwrap();
    assert!(stats.available <= stats.max_pool_size);
}

#[test]
fn test_predictive_prewarm_refills_drained_pool() {
    let pools = PoolManager::from_config(&config(100, 0));

    for _ in 0..10 {
        let obj = pools.allocate(16).unwrap();
        pools.release(obj, 16).unwrap();
    }
    // Drain the only idle object
    let held = pools.allocate(16).unwrap();
    assert_eq!(pools.pool_stats(SizeClass::Small).unwrap().available, 0);

    assert_eq!(pools.predictive_prewarm(), 1);
    assert_eq!(pools.pool_stats(SizeClass::Small).unwrap().available, 1);
    // Untouched pools have no recycling history to go on
    assert_eq!(pools.pool_stats(SizeClass::Large).unwrap().available, 0);

    pools.release(held, 16).unwrap();
}

#[test]
fn test_predictive_prewarm_disabled() {
    let config = MonitorConfig {
        enable_predictive_allocation: false,
        pool_prealloc: 0,
        ..MonitorConfig::default()
    };
    let pools = PoolManager::from_config(&config);

    for _ in 0..10 {
        let obj = pools.allocate(16).unwrap();
        pools.release(obj, 16).unwrap();
    }
    let _held = pools.allocate(16).unwrap();
    assert_eq!(pools.predictive_prewarm(), 0);
}

#[test]
fn test_cleanup_keeps_a_tenth() {
    let pools = PoolManager::from_config(&config(1000, 10));

    assert_eq!(pools.cleanup(), 36);
    for class in SizeClass::ALL {
        assert_eq!(pools.pool_stats(class).unwrap().available, 1);
    }
}

#[test]
fn test_emergency_trim_keeps_newest_ten() {
    let pools = PoolManager::from_config(&config(1000, 25));

    assert_eq!(pools.emergency_trim(), 60);
    for class in SizeClass::ALL {
        assert_eq!(pools.pool_stats(class).unwrap().available, 10);
    }

    // Nothing left to release
    assert_eq!(pools.emergency_trim(), 0);
}

#[test]
fn test_cleanup_never_touches_checked_out_objects() {
    let pools = PoolManager::from_config(&config(1000, 10));
    let held = pools.allocate(16).unwrap();

    pools.emergency_trim();
    pools.cleanup();

    assert_eq!(pools.pool_stats(SizeClass::Small).unwrap().allocated, 1);
    pools.release(held, 16).unwrap();
}
