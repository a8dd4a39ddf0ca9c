//! Preprocessing: capping with exempt series held back and reinserted.

use crate::core::SeriesFrame;
use crate::error::{PipelineError, Result};
use crate::transform::capping::{cap_outliers, CapStrategy};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Seasonal item that is never capped by default.
pub const DEFAULT_EXEMPT_SERIES: &str = "Pumpkin spice latte";

/// Options for [`preprocess`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessOptions {
    /// Capping strategy applied to non-exempt series.
    pub strategy: CapStrategy,
    /// Series identifiers excluded from capping and reinserted verbatim.
    pub exempt_series: Vec<String>,
    /// Inclusive upper bound on dates kept after processing.
    pub end_date: Option<NaiveDate>,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            strategy: CapStrategy::default(),
            exempt_series: vec![DEFAULT_EXEMPT_SERIES.to_string()],
            end_date: None,
        }
    }
}

/// Split `frame` into (all other series, exempt series).
///
/// Every exempt identifier must occur in the frame; a missing one is an
/// [`PipelineError::EmptySeries`] since reinsertion would otherwise skip it
/// silently.
pub fn split_exempt(frame: SeriesFrame, exempt: &[String]) -> Result<(SeriesFrame, SeriesFrame)> {
    let present = frame.series_ids();
    if let Some(missing) = exempt.iter().find(|id| !present.contains(id)) {
        return Err(PipelineError::EmptySeries(missing.clone()));
    }
    let (held, rest) = frame.partition(|r| exempt.contains(&r.unique_id));
    Ok((rest, held))
}

/// Put exempt rows back next to the capped rows and restore `(unique_id, ds)` order.
///
/// Values are `f64` on both sides, so the exempt rows go back bit-for-bit.
pub fn reinsert(capped: SeriesFrame, exempt: SeriesFrame) -> SeriesFrame {
    capped.concat(exempt).sorted()
}

/// Cap outliers per series, leaving exempt series untouched, then sort and
/// apply the optional date ceiling.
///
/// An empty input yields an empty output without checking exemptions.
pub fn preprocess(frame: SeriesFrame, options: &PreprocessOptions) -> Result<SeriesFrame> {
    options.strategy.validate()?;
    if frame.is_empty() {
        return Ok(frame);
    }

    let (rest, exempt) = split_exempt(frame, &options.exempt_series)?;
    info!(
        capped_rows = rest.len(),
        exempt_rows = exempt.len(),
        exempt_series = ?options.exempt_series,
        "holding back exempt series"
    );

    let capped = cap_outliers(rest, &options.strategy)?;
    info!(
        strategy = options.strategy.name(),
        series = capped.bounds.len(),
        replaced = capped.capped_rows,
        "capped outliers"
    );

    let combined = reinsert(capped.frame, exempt);
    Ok(match options.end_date {
        Some(end) => combined.with_date_ceiling(end),
        None => combined,
    })
}
