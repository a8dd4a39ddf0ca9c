//! Per-series outlier capping.
//!
//! Bounds are derived from each series' own distribution and rounded to whole
//! units, since view counts are integral. Values outside the bounds are
//! clipped; nothing else about the frame changes.
//!
//! On integral counts IQR capping is idempotent: the rounded bounds never
//! cut inside `[Q1, Q3]`, so a second pass sees the same quartiles. On
//! fractional values rounding can move a bound past a quartile and a
//! second pass may clip again.

use crate::core::SeriesFrame;
use crate::error::{PipelineError, Result};
use crate::utils::stats::{mean, quantile_nearest, std_dev};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// How bounds are derived from a series' values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum CapStrategy {
    /// `[Q1 - factor * IQR, Q3 + factor * IQR]`.
    Iqr { factor: f64 },
    /// Empirical percentiles, given in percent (`0..=100`).
    Percentile { lower: f64, upper: f64 },
    /// `mean ± threshold * stddev` (sample standard deviation).
    #[serde(rename = "zscore")]
    ZScore { threshold: f64 },
}

impl Default for CapStrategy {
    fn default() -> Self {
        Self::Iqr { factor: 1.5 }
    }
}

impl CapStrategy {
    /// IQR capping with the given multiplier (default 1.5).
    pub fn iqr(factor: f64) -> Self {
        Self::Iqr { factor }
    }

    /// Percentile capping, bounds in percent (default 1 / 99).
    pub fn percentile(lower: f64, upper: f64) -> Self {
        Self::Percentile { lower, upper }
    }

    /// Z-score capping with the given threshold (default 3.0).
    pub fn z_score(threshold: f64) -> Self {
        Self::ZScore { threshold }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Iqr { .. } => "iqr",
            Self::Percentile { .. } => "percentile",
            Self::ZScore { .. } => "zscore",
        }
    }

    /// Reject parameters that cannot produce meaningful bounds.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Iqr { factor } if !(factor.is_finite() && factor >= 0.0) => Err(
                PipelineError::Config(format!("iqr factor must be non-negative, got {factor}")),
            ),
            Self::Percentile { lower, upper }
                if !(0.0..=100.0).contains(&lower)
                    || !(0.0..=100.0).contains(&upper)
                    || lower >= upper =>
            {
                Err(PipelineError::Config(format!(
                    "percentile bounds must satisfy 0 <= lower < upper <= 100, got {lower}/{upper}"
                )))
            }
            Self::ZScore { threshold } if !(threshold.is_finite() && threshold > 0.0) => {
                Err(PipelineError::Config(format!(
                    "z-score threshold must be positive, got {threshold}"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Rounded bounds for one series, or `None` when the values do not
    /// determine any (empty series, or a single value under z-score).
    pub fn bounds(&self, values: &[f64]) -> Option<Bounds> {
        if values.is_empty() {
            return None;
        }
        let (lower, upper) = match *self {
            Self::Iqr { factor } => {
                let q1 = quantile_nearest(values, 0.25);
                let q3 = quantile_nearest(values, 0.75);
                let iqr = q3 - q1;
                (q1 - factor * iqr, q3 + factor * iqr)
            }
            Self::Percentile { lower, upper } => (
                quantile_nearest(values, lower / 100.0),
                quantile_nearest(values, upper / 100.0),
            ),
            Self::ZScore { threshold } => {
                let m = mean(values);
                let sd = std_dev(values);
                if !sd.is_finite() {
                    return None;
                }
                (m - threshold * sd, m + threshold * sd)
            }
        };
        Some(Bounds::new(lower.round(), upper.round()))
    }
}

/// Inclusive clipping range of one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Replace values below `lower` by `lower` and above `upper` by `upper`.
    pub fn clip(&self, value: f64) -> f64 {
        if value < self.lower {
            self.lower
        } else if value > self.upper {
            self.upper
        } else {
            value
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Output of [`cap_outliers`].
#[derive(Debug, Clone)]
pub struct CappedFrame {
    pub frame: SeriesFrame,
    /// Bounds per series identifier.
    pub bounds: BTreeMap<String, Bounds>,
    /// Number of rows whose value was replaced.
    pub capped_rows: usize,
}

/// Compute one bound pair per series in a single grouped pass.
pub fn compute_bounds(frame: &SeriesFrame, strategy: &CapStrategy) -> BTreeMap<String, Bounds> {
    let mut grouped: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in frame.iter() {
        grouped.entry(row.unique_id.as_str()).or_default().push(row.y);
    }
    grouped
        .into_iter()
        .filter_map(|(id, values)| strategy.bounds(&values).map(|b| (id.to_string(), b)))
        .collect()
}

/// Cap every series of `frame` against its own bounds.
///
/// Row order and all other fields are left untouched. An empty frame yields an
/// empty frame. Repeating the call is a no-op for IQR capping only when the
/// values are whole numbers.
pub fn cap_outliers(mut frame: SeriesFrame, strategy: &CapStrategy) -> Result<CappedFrame> {
    strategy.validate()?;
    let bounds = compute_bounds(&frame, strategy);

    let mut capped_rows = 0;
    for row in frame.rows_mut() {
        if let Some(b) = bounds.get(row.unique_id.as_str()) {
            let clipped = b.clip(row.y);
            if clipped != row.y {
                row.y = clipped;
                capped_rows += 1;
            }
        }
    }

    for (id, b) in &bounds {
        debug!(series = %id, lower = b.lower, upper = b.upper, "outlier bounds");
    }

    Ok(CappedFrame {
        frame,
        bounds,
        capped_rows,
    })
}
