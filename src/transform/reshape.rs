//! Wide-to-long reshaping of the daily pageview table.

use crate::core::{Observation, SeriesFrame};
use crate::error::{PipelineError, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// Wide table: one date column and one value column per series.
#[derive(Debug, Clone, PartialEq)]
pub struct WideTable {
    date_column: String,
    dates: Vec<String>,
    series: Vec<(String, Vec<f64>)>,
}

impl WideTable {
    /// Build a wide table, checking every series column matches the date column length.
    pub fn new(
        date_column: impl Into<String>,
        dates: Vec<String>,
        series: Vec<(String, Vec<f64>)>,
    ) -> Result<Self> {
        for (name, values) in &series {
            if values.len() != dates.len() {
                return Err(PipelineError::Format(format!(
                    "column '{name}' has {} values but there are {} dates",
                    values.len(),
                    dates.len()
                )));
            }
        }
        Ok(Self {
            date_column: date_column.into(),
            dates,
            series,
        })
    }

    pub fn date_column(&self) -> &str {
        &self.date_column
    }

    /// Raw date strings in row order.
    pub fn dates(&self) -> &[String] {
        &self.dates
    }

    /// Series names in column order.
    pub fn series_names(&self) -> Vec<&str> {
        self.series.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn n_dates(&self) -> usize {
        self.dates.len()
    }

    pub fn n_series(&self) -> usize {
        self.series.len()
    }
}

/// Parse an ISO-8601 date, accepting a trailing time component.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt.date());
        }
    }
    Err(PipelineError::Format(format!("unparseable date '{raw}'")))
}

/// Convert a wide table to a long `(unique_id, ds, y)` frame.
///
/// Every non-date column becomes a series. Rows are emitted column by column,
/// dates in input order, so the result has `n_dates * n_series` rows. No
/// deduplication is performed.
pub fn reshape(table: &WideTable) -> Result<SeriesFrame> {
    let dates = table
        .dates
        .iter()
        .map(|raw| parse_date(raw))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::with_capacity(dates.len() * table.series.len());
    for (name, values) in &table.series {
        for (&ds, &y) in dates.iter().zip(values) {
            rows.push(Observation::new(name.clone(), ds, y));
        }
    }
    Ok(SeriesFrame::new(rows))
}
