/*!
 * Leak Detection
 * Sustained-growth leak suspects from heap and external memory trends
 *
 * Strategy: fit the last 30 snapshots (at least 10). Consistent heap growth
 * (slope at or above the threshold with r > 0.8) is a heap-growth suspect;
 * external memory growing faster than half the threshold is an
 * external-growth suspect. Suspects expire after 24h.
 */

use super::analysis::Trend;
use super::sampler::Snapshot;
use crate::core::limits::{
    EXTERNAL_LEAK_FACTOR, LEAK_CORRELATION_GATE, LEAK_ESCALATION_FACTOR, LEAK_MAX_AGE,
    LEAK_MIN_SAMPLES,
};
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Which series grew
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakKind {
    HeapGrowth,
    ExternalGrowth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeakSeverity {
    Low,
    Medium,
    High,
}

/// Trend figures kept with a suspect (MiB per sample, MiB)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeakTrend {
    pub slope: f64,
    pub correlation: f64,
    pub current: f64,
}

impl From<&Trend> for LeakTrend {
    fn from(trend: &Trend) -> Self {
        Self {
            slope: trend.slope,
            correlation: trend.correlation,
            current: trend.current,
        }
    }
}

/// A flagged growth pattern before it is registered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakFinding {
    pub kind: LeakKind,
    pub severity: LeakSeverity,
    pub description: String,
    pub trend: LeakTrend,
}

/// Registered leak suspect; never mutated after insertion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeakSuspect {
    pub id: String,
    pub kind: LeakKind,
    pub description: String,
    pub severity: LeakSeverity,
    pub trend: LeakTrend,
    pub timestamp_ms: u64,
}

/// Classify heap and external trends against the leak threshold
pub fn classify(heap: Option<&Trend>, external: Option<&Trend>, threshold: f64) -> Vec<LeakFinding> {
    let mut findings = Vec::new();

    if let Some(trend) = heap {
        if trend.slope >= threshold && trend.correlation > LEAK_CORRELATION_GATE {
            let severity = if trend.slope > threshold * LEAK_ESCALATION_FACTOR {
                LeakSeverity::High
            } else {
                LeakSeverity::Medium
            };
            findings.push(LeakFinding {
                kind: LeakKind::HeapGrowth,
                severity,
                description: format!(
                    "Heap growing {:.3} MiB/sample (r = {:.2}), now {:.1} MiB",
                    trend.slope, trend.correlation, trend.current
                ),
                trend: trend.into(),
            });
        }
    }

    if let Some(trend) = external {
        if trend.slope > threshold * EXTERNAL_LEAK_FACTOR {
            findings.push(LeakFinding {
                kind: LeakKind::ExternalGrowth,
                severity: LeakSeverity::Low,
                description: format!(
                    "External memory growing {:.3} MiB/sample, now {:.1} MiB",
                    trend.slope, trend.current
                ),
                trend: trend.into(),
            });
        }
    }

    findings
}

/// Run leak classification over a snapshot window (oldest first)
///
/// Returns nothing until the window holds enough samples.
pub fn detect(window: &[Arc<Snapshot>], threshold: f64) -> Vec<LeakFinding> {
    if window.len() < LEAK_MIN_SAMPLES {
        return Vec::new();
    }

    let heap: Vec<f64> = window.iter().map(|s| s.heap_used_mib()).collect();
    let external: Vec<f64> = window.iter().map(|s| s.external_mib()).collect();

    classify(
        Trend::fit(&heap).as_ref(),
        Trend::fit(&external).as_ref(),
        threshold,
    )
}

/// Active leak suspects keyed by id
#[derive(Debug)]
pub struct LeakRegistry {
    suspects: DashMap<String, LeakSuspect, RandomState>,
}

impl LeakRegistry {
    pub fn new() -> Self {
        Self {
            suspects: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Register a finding under a fresh id
    pub fn insert(&self, finding: LeakFinding, timestamp_ms: u64) -> LeakSuspect {
        let suspect = LeakSuspect {
            id: Uuid::new_v4().to_string(),
            kind: finding.kind,
            description: finding.description,
            severity: finding.severity,
            trend: finding.trend,
            timestamp_ms,
        };
        self.suspects.insert(suspect.id.clone(), suspect.clone());
        suspect
    }

    /// Drop suspects older than 24h; returns how many were removed
    pub fn evict_expired(&self, now_ms: u64) -> usize {
        let max_age = LEAK_MAX_AGE.as_millis() as u64;
        let before = self.suspects.len();
        self.suspects
            .retain(|_, suspect| now_ms.saturating_sub(suspect.timestamp_ms) <= max_age);
        before - self.suspects.len()
    }

    pub fn get(&self, id: &str) -> Option<LeakSuspect> {
        self.suspects.get(id).map(|entry| entry.value().clone())
    }

    /// All suspects, oldest first
    pub fn active(&self) -> Vec<LeakSuspect> {
        let mut suspects: Vec<LeakSuspect> = self
            .suspects
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        suspects.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms).then_with(|| a.id.cmp(&b.id)));
        suspects
    }

    pub fn len(&self) -> usize {
        self.suspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suspects.is_empty()
    }

    pub fn clear(&self) {
        self.suspects.clear();
    }
}

impl Default for LeakRegistry {
    fn default() -> Self {
        Self::new()
    }
}
