/*!
 * Pool Routing Tests
 * Size-class resolution, reuse and rejection of foreign objects
 */

use memory_orchestrator::config::{MonitorConfig, PoolSizes};
use memory_orchestrator::memory::{PoolManager, SizeClass};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn manager() -> PoolManager {
    PoolManager::new(&PoolSizes::default(), 1000)
}

#[test]
fn test_requests_route_to_smallest_fitting_class() {
    let pools = manager();

    let cases = [
        (1, SizeClass::Small),
        (64, SizeClass::Small),
        (65, SizeClass::Medium),
        (1024, SizeClass::Medium),
        (1025, SizeClass::Large),
        (16384, SizeClass::Large),
        (16385, SizeClass::XLarge),
        (65536, SizeClass::XLarge),
    ];

    for (size, expected) in cases {
        let obj = pools.allocate(size).unwrap();
        assert_eq!(obj.size_class(), expected, "size {}", size);
        assert!(obj.capacity() >= size);
        pools.release(obj, size).unwrap();
    }
    assert_eq!(pools.oversized_requests(), 0);
}

#[test]
fn test_oversized_request_falls_back_to_largest_class() {
    let pools = manager();

    let obj = pools.allocate(1 << 20).unwrap();
    assert_eq!(obj.size_class(), SizeClass::XLarge);
    assert_eq!(obj.capacity(), 65536);
    assert_eq!(pools.oversized_requests(), 1);

    pools.release(obj, 1 << 20).unwrap();
    assert_eq!(pools.stats().oversized_requests, 2);
}

#[test]
fn test_returned_object_is_reused_zeroed() {
    let pools = manager();

    let mut first = pools.allocate(32).unwrap();
    let id = first.id();
    first.fill(0xAB);
    pools.release(first, 32).unwrap();

    let second = pools.allocate(32).unwrap();
    assert_eq!(second.id(), id);
    assert!(second.iter().all(|&b| b == 0));

    let stats = pools.pool_stats(SizeClass::Small).unwrap();
    assert_eq!(stats.reuses, 1);
    assert_eq!(stats.allocated, 1);
    assert_eq!(stats.hit_rate(), 0.5);
}

#[test]
fn test_foreign_object_is_handed_back() {
    let ours = manager();
    let theirs = manager();

    let obj = theirs.allocate(100).unwrap();
    let id = obj.id();

    let rejected = ours.release(obj, 100).unwrap_err();
    assert_eq!(rejected.id(), id);

    let stats = ours.pool_stats(SizeClass::Medium).unwrap();
    assert_eq!(stats.available, 0);
    assert_eq!(stats.total_deallocations, 0);

    // Still returnable to its owner
    theirs.release(rejected, 100).unwrap();
}

#[test]
fn test_return_with_wrong_size_is_rejected() {
    let pools = manager();

    let obj = pools.allocate(10).unwrap();
    let obj = pools.release(obj, 5000).unwrap_err();
    assert_eq!(obj.size_class(), SizeClass::Small);
    pools.release(obj, 10).unwrap();
}

#[test]
fn test_disabled_pools_hand_out_nothing() {
    let config = MonitorConfig {
        enable_memory_pools: false,
        ..MonitorConfig::default()
    };
    let pools = PoolManager::from_config(&config);

    assert!(!pools.is_enabled());
    assert!(pools.allocate(10).is_none());
    assert!(pools.mean_efficiency().is_none());
    assert!(pools.self_tune().is_empty());
}

#[test]
fn test_prealloc_fills_every_pool() {
    let pools = PoolManager::from_config(&MonitorConfig::default());
    for class in SizeClass::ALL {
        assert_eq!(pools.pool_stats(class).unwrap().available, 10);
    }
}

#[derive(Debug, Clone)]
enum Op {
    Allocate(usize),
    Release(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..70_000).prop_map(Op::Allocate),
        (0usize..64).prop_map(Op::Release),
    ]
}

proptest! {
    #[test]
    fn prop_object_never_idle_and_checked_out(ops in prop::collection::vec(op(), 1..200)) {
        let pools = manager();
        let mut held: Vec<(memory_orchestrator::PoolObject, usize)> = Vec::new();

        for op in ops {
            match op {
                Op::Allocate(size) => {
                    let obj = pools.allocate(size).unwrap();
                    held.push((obj, size));
                }
                Op::Release(idx) if !held.is_empty() => {
                    let (obj, size) = held.swap_remove(idx % held.len());
                    prop_assert!(pools.release(obj, size).is_ok());
                }
                Op::Release(_) => {}
            }

            for (obj, _) in &held {
                prop_assert!(!pools.idle_elsewhere(obj.size_class(), obj.id()));
            }
        }

        let outstanding: usize = SizeClass::ALL
            .iter()
            .map(|&class| pools.pool_stats(class).unwrap().allocated)
            .sum();
        prop_assert_eq!(outstanding, held.len());
    }
}
