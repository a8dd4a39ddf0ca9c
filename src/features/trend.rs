//! Linear trend regressor and future horizon keys.

use crate::core::{Column, FeatureFrame};
use crate::error::{PipelineError, Result};
use crate::features::fourier::day_index;
use chrono::{Duration, NaiveDate};

/// Name of the trend column.
pub const TREND_COLUMN: &str = "trend";

/// Append a `trend` column holding the day index of each row relative to `origin`.
///
/// Because the index is tied to the calendar date, a future table built
/// from the same origin continues the history without a reset or a gap.
pub fn add_trend(frame: FeatureFrame, origin: NaiveDate) -> Result<FeatureFrame> {
    let values = frame.ds().iter().map(|&ds| day_index(ds, origin)).collect();
    frame.with_column(TREND_COLUMN, Column::Float(values))
}

/// Key table of the `horizon` steps following each series' last date.
///
/// Series appear in identifier order, each with dates
/// `last + freq_days, last + 2 * freq_days, ...`. A horizon that runs past
/// the representable date range is a config error.
pub fn future_keys(history: &FeatureFrame, horizon: usize, freq_days: i64) -> Result<FeatureFrame> {
    let last = history.last_dates();
    let mut ids = Vec::with_capacity(last.len() * horizon);
    let mut dates = Vec::with_capacity(last.len() * horizon);
    for (id, last_date) in last {
        for step in 1..=horizon as i64 {
            let ds = step
                .checked_mul(freq_days)
                .and_then(Duration::try_days)
                .and_then(|offset| last_date.checked_add_signed(offset))
                .ok_or_else(|| {
                    PipelineError::Config(format!(
                        "future step {step} of {freq_days} days after {last_date} leaves the date range"
                    ))
                })?;
            ids.push(id.to_string());
            dates.push(ds);
        }
    }
    FeatureFrame::from_keys(ids, dates)
}
