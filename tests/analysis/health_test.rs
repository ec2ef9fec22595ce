/*!
 * Health Score Tests
 */

use memory_orchestrator::monitoring::{health_score, HealthInputs};
use proptest::prelude::*;

fn inputs() -> impl Strategy<Value = HealthInputs> {
    (
        0.0f64..=1.0,
        0.0f64..=1.0,
        0usize..20,
        0.0f64..200.0,
        prop::option::of(0.0f64..=1.0),
    )
        .prop_map(
            |(overall_pressure, fragmentation, active_leaks, average_collection_ms, pool_efficiency)| {
                HealthInputs {
                    overall_pressure,
                    fragmentation,
                    active_leaks,
                    average_collection_ms,
                    pool_efficiency,
                }
            },
        )
}

#[test]
fn test_many_leaks_floor_at_zero() {
    let inputs = HealthInputs {
        overall_pressure: 1.0,
        fragmentation: 1.0,
        active_leaks: 50,
        average_collection_ms: 500.0,
        pool_efficiency: None,
    };
    assert_eq!(health_score(&inputs), 0.0);
}

#[test]
fn test_pool_bonus_is_capped() {
    let inputs = HealthInputs {
        pool_efficiency: Some(1.0),
        ..HealthInputs::default()
    };
    assert_eq!(health_score(&inputs), 100.0);
}

proptest! {
    #[test]
    fn prop_score_in_range(inputs in inputs()) {
        let score = health_score(&inputs);
        prop_assert!((0.0..=100.0).contains(&score));
    }

    #[test]
    fn prop_more_pressure_never_improves_health(inputs in inputs(), extra in 0.0f64..=1.0) {
        let worse = HealthInputs {
            overall_pressure: (inputs.overall_pressure + extra).min(1.0),
            ..inputs
        };
        prop_assert!(health_score(&worse) <= health_score(&inputs));
    }

    #[test]
    fn prop_another_leak_never_improves_health(inputs in inputs()) {
        let worse = HealthInputs {
            active_leaks: inputs.active_leaks + 1,
            ..inputs
        };
        prop_assert!(health_score(&worse) <= health_score(&inputs));
    }
}
