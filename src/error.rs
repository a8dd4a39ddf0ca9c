//! Error types for the cafe-forecast pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while cleaning, splitting, featurising or forecasting.
///
/// Every variant is fatal to the current run; no stage retries.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Unparseable date, non-numeric value or wrong input shape.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid split boundaries, horizon or capping parameters.
    #[error("config error: {0}")]
    Config(String),

    /// A join or column operation did not find the expected keys or columns.
    #[error("schema error: {0}")]
    Schema(String),

    /// A named exemption series is absent from the input.
    #[error("series not found: {0}")]
    EmptySeries(String),

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Filesystem failure while reading input or persisting output.
    #[error("i/o error ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reader or writer failure.
    #[error("csv error: {0}")]
    Csv(String),
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<csv::Error> for PipelineError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}
