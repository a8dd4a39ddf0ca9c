//! Forecasting contracts: per-series [`Forecaster`] and table-level
//! [`FrameForecaster`].

use crate::core::{FeatureFrame, Forecast};
use crate::error::Result;

/// Common interface for univariate forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to one series' values in date order.
    fn fit(&mut self, values: &[f64]) -> Result<()>;

    /// Point predictions for the next `horizon` steps.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// In-sample predictions.
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Actual minus fitted.
    fn residuals(&self) -> Option<&[f64]>;

    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use cafe_forecast::models::{BoxedForecaster, Forecaster};
/// use cafe_forecast::models::baseline::Naive;
///
/// let model: BoxedForecaster = Box::new(Naive::new());
/// assert_eq!(model.name(), "Naive");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Table-level forecasting collaborator.
///
/// `fit` consumes a history table `{unique_id, ds, y, ...features}`;
/// `predict` consumes a future table `{unique_id, ds, ...features}` and
/// returns `{unique_id, ds, <name>}` with exactly the future table's rows.
pub trait FrameForecaster {
    fn fit(&mut self, history: &FeatureFrame) -> Result<()>;

    fn predict(&self, future: &FeatureFrame) -> Result<FeatureFrame>;

    /// Name of the prediction column.
    fn name(&self) -> &str;
}
