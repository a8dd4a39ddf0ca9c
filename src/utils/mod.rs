//! Descriptive statistics and forecast accuracy metrics.

pub mod metrics;
pub mod stats;

pub use metrics::{evaluate, mae, mase, mse, rmse, smape, MetricsTable, ModelMetrics};
pub use stats::{mean, quantile_nearest, std_dev, variance};
