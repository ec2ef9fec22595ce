/*!
 * Health Scoring
 * Single 0-100 figure summarizing pressure, fragmentation, leaks and GC cost
 */

use crate::core::limits::{
    HEALTH_FRAGMENTATION_WEIGHT, HEALTH_LEAK_PENALTY, HEALTH_POOL_BONUS, HEALTH_PRESSURE_WEIGHT,
    HEALTH_SLOW_GC_PENALTY, SLOW_COLLECTION_MS,
};

/// Inputs to the health score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HealthInputs {
    pub overall_pressure: f64,
    pub fragmentation: f64,
    pub active_leaks: usize,
    /// Mean collection duration (ms), 0 without history
    pub average_collection_ms: f64,
    /// Mean pool efficiency, `None` when pooling is disabled
    pub pool_efficiency: Option<f64>,
}

/// Health score in [0, 100]; higher is healthier
pub fn health_score(inputs: &HealthInputs) -> f64 {
    let mut score = 100.0;
    score -= inputs.overall_pressure.clamp(0.0, 1.0) * HEALTH_PRESSURE_WEIGHT;
    score -= inputs.fragmentation.clamp(0.0, 1.0) * HEALTH_FRAGMENTATION_WEIGHT;
    score -= inputs.active_leaks as f64 * HEALTH_LEAK_PENALTY;

    if inputs.average_collection_ms > SLOW_COLLECTION_MS {
        score -= HEALTH_SLOW_GC_PENALTY;
    }

    if let Some(efficiency) = inputs.pool_efficiency {
        score += efficiency.clamp(0.0, 1.0) * HEALTH_POOL_BONUS;
    }

    score.clamp(0.0, 100.0)
}
