//! Forecasting models consuming the pipeline's feature tables.

mod per_series;
mod traits;

pub mod baseline;

pub use per_series::PerSeries;
pub use traits::{BoxedForecaster, Forecaster, FrameForecaster};
