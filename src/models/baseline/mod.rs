//! Baseline forecasting models.
//!
//! Simple methods that serve as benchmarks for more complex models.

mod naive;
mod seasonal_naive;
mod seasonal_window;

pub use naive::Naive;
pub use seasonal_naive::SeasonalNaive;
pub use seasonal_window::SeasonalWindowAverage;
