/*!
 * Trend Analysis
 * Least-squares regression over the sample index axis
 *
 * Strategy: fit `y = slope * i + intercept` for i = 0..n and report Pearson's
 * r alongside, so callers can gate on both growth rate and consistency.
 */

use crate::core::limits::STABLE_SLOPE_EPSILON;
use serde::{Deserialize, Serialize};

/// Direction of a fitted trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl TrendDirection {
    fn from_slope(slope: f64) -> Self {
        if slope > STABLE_SLOPE_EPSILON {
            TrendDirection::Increasing
        } else if slope < -STABLE_SLOPE_EPSILON {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Fitted linear trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Change per sample
    pub slope: f64,
    pub intercept: f64,
    /// Pearson's r in [-1, 1]; 0 when either axis has no variance
    pub correlation: f64,
    /// Last value of the series
    pub current: f64,
    pub direction: TrendDirection,
}

impl Trend {
    /// Fit a series; `None` with fewer than two points
    pub fn fit(series: &[f64]) -> Option<Trend> {
        let n = series.len();
        if n < 2 {
            return None;
        }

        let count = n as f64;
        let mean_x = (count - 1.0) / 2.0;
        let mean_y = series.iter().sum::<f64>() / count;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (i, &y) in series.iter().enumerate() {
            let dx = i as f64 - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let slope = cov / var_x;
        let intercept = mean_y - slope * mean_x;
        let correlation = if var_y > 0.0 {
            (cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0)
        } else {
            0.0
        };

        Some(Trend {
            slope,
            intercept,
            correlation,
            current: series[n - 1],
            direction: TrendDirection::from_slope(slope),
        })
    }

    /// Fitted value at sample `index`
    #[inline]
    pub fn predict(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }
}
