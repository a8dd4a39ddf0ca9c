//! Wide CSV ingestion.

use crate::error::{PipelineError, Result};
use crate::transform::WideTable;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::info;

/// Read a wide pageview table from a CSV file.
///
/// The header must contain `date_column` and at least one other column;
/// every other cell must parse as a number. Dates are kept as raw text.
pub fn read_wide_csv(path: impl AsRef<Path>, date_column: &str) -> Result<WideTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    let table = parse_wide_csv(BufReader::new(file), date_column)?;
    info!(
        path = %path.display(),
        dates = table.n_dates(),
        series = table.n_series(),
        "read wide table"
    );
    Ok(table)
}

/// Parse a wide table from any reader.
pub fn parse_wide_csv<R: Read>(reader: R, date_column: &str) -> Result<WideTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let date_idx = headers
        .iter()
        .position(|h| h == date_column)
        .ok_or_else(|| PipelineError::Format(format!("missing date column '{date_column}'")))?;
    let series_cols: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != date_idx)
        .map(|(i, h)| (i, h.to_string()))
        .collect();
    if series_cols.is_empty() {
        return Err(PipelineError::Format(
            "input has no series columns".to_string(),
        ));
    }

    let mut dates = Vec::new();
    let mut values: Vec<Vec<f64>> = vec![Vec::new(); series_cols.len()];
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = idx + 2;
        let raw_date = record
            .get(date_idx)
            .ok_or_else(|| PipelineError::Format(format!("line {line}: missing date")))?;
        dates.push(raw_date.to_string());

        for ((col, name), out) in series_cols.iter().zip(values.iter_mut()) {
            let cell = record.get(*col).unwrap_or("");
            let value = cell.parse::<f64>().map_err(|_| {
                PipelineError::Format(format!(
                    "line {line}, column '{name}': '{cell}' is not a number"
                ))
            })?;
            out.push(value);
        }
    }

    let series = series_cols
        .into_iter()
        .map(|(_, name)| name)
        .zip(values)
        .collect();
    WideTable::new(date_column, dates, series)
}
