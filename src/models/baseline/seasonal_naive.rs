//! Seasonal Naive forecasting model.
//!
//! Forecasts by repeating the value from the same season in the previous cycle.
//! This is the reference baseline every candidate is compared against.

use crate::core::Forecast;
use crate::error::{PipelineError, Result};
use crate::models::Forecaster;

/// Seasonal Naive forecaster.
///
/// Each forecast equals the observation one seasonal period earlier; beyond
/// one period the last observed cycle repeats.
#[derive(Debug, Clone)]
pub struct SeasonalNaive {
    period: usize,
    last_cycle: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalNaive {
    /// Create a new SeasonalNaive model with the given seasonal period.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
            last_cycle: None,
            fitted: None,
            residuals: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Default for SeasonalNaive {
    fn default() -> Self {
        Self::new(7)
    }
}

impl Forecaster for SeasonalNaive {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.len() < self.period {
            return Err(PipelineError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        // y_hat[t] = y[t - period]
        let fitted: Vec<f64> = (0..values.len())
            .map(|i| {
                if i < self.period {
                    f64::NAN
                } else {
                    values[i - self.period]
                }
            })
            .collect();
        let residuals = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();

        self.last_cycle = Some(values[values.len() - self.period..].to_vec());
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let cycle = self.last_cycle.as_ref().ok_or(PipelineError::FitRequired)?;
        let predictions = (0..horizon).map(|h| cycle[h % self.period]).collect();
        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalNaive"
    }
}
