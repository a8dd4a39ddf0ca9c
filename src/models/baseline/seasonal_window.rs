//! Seasonal Window Average forecasting model.
//!
//! Forecasts by averaging observations from the same season across multiple cycles.

use crate::core::Forecast;
use crate::error::{PipelineError, Result};
use crate::models::Forecaster;

/// Seasonal Window Average forecaster.
///
/// Each step is the mean of the same season position over the last
/// `window` complete cycles that the history covers.
#[derive(Debug, Clone)]
pub struct SeasonalWindowAverage {
    period: usize,
    window: usize,
    profile: Option<Vec<f64>>,
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

impl SeasonalWindowAverage {
    /// `window` is the number of seasonal cycles to average (1 = SeasonalNaive).
    pub fn new(period: usize, window: usize) -> Self {
        Self {
            period: period.max(1),
            window: window.max(1),
            profile: None,
            fitted: None,
            residuals: None,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Mean of `values[pos - k * period]` for `k = 1..=window` where defined.
    fn seasonal_mean(&self, values: &[f64], pos: usize) -> Option<f64> {
        let lagged: Vec<f64> = (1..=self.window)
            .filter_map(|k| pos.checked_sub(k * self.period))
            .map(|idx| values[idx])
            .collect();
        if lagged.is_empty() {
            None
        } else {
            Some(lagged.iter().sum::<f64>() / lagged.len() as f64)
        }
    }
}

impl Default for SeasonalWindowAverage {
    fn default() -> Self {
        Self::new(7, 4)
    }
}

impl Forecaster for SeasonalWindowAverage {
    fn fit(&mut self, values: &[f64]) -> Result<()> {
        if values.len() < self.period {
            return Err(PipelineError::InsufficientData {
                needed: self.period,
                got: values.len(),
            });
        }

        let n = values.len();
        let fitted: Vec<f64> = (0..n)
            .map(|i| self.seasonal_mean(values, i).unwrap_or(f64::NAN))
            .collect();
        let residuals = values.iter().zip(&fitted).map(|(y, f)| y - f).collect();

        // Forecast profile: one value per season position of the next cycle.
        let profile = (0..self.period)
            .map(|s| self.seasonal_mean(values, n + s).unwrap_or(f64::NAN))
            .collect();

        self.profile = Some(profile);
        self.fitted = Some(fitted);
        self.residuals = Some(residuals);
        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        let profile = self.profile.as_ref().ok_or(PipelineError::FitRequired)?;
        let predictions = (0..horizon).map(|h| profile[h % self.period]).collect();
        Ok(Forecast::from_values(predictions))
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.fitted.as_deref()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.residuals.as_deref()
    }

    fn name(&self) -> &str {
        "SeasonalWindowAverage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::baseline::SeasonalNaive;
    use approx::assert_relative_eq;

    #[test]
    fn averages_same_season_across_cycles() {
        let mut model = SeasonalWindowAverage::new(2, 2);
        model.fit(&[1.0, 10.0, 3.0, 20.0]).unwrap();
        let preds = model.predict(4).unwrap();
        assert_relative_eq!(preds.primary()[0], 2.0);
        assert_relative_eq!(preds.primary()[1], 15.0);
        assert_eq!(preds.primary()[2], preds.primary()[0]);
        assert_eq!(preds.primary()[3], preds.primary()[1]);
    }

    #[test]
    fn window_of_one_matches_seasonal_naive() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0];
        let mut window = SeasonalWindowAverage::new(3, 1);
        let mut naive = SeasonalNaive::new(3);
        window.fit(&values).unwrap();
        naive.fit(&values).unwrap();
        assert_eq!(window.predict(7).unwrap(), naive.predict(7).unwrap());
    }

    #[test]
    fn uses_available_cycles_only() {
        let mut model = SeasonalWindowAverage::new(2, 5);
        model.fit(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        let preds = model.predict(2).unwrap();
        assert_relative_eq!(preds.primary()[0], 2.0);
        assert_relative_eq!(preds.primary()[1], 3.0);
    }

    #[test]
    fn short_series_is_insufficient() {
        let mut model = SeasonalWindowAverage::new(7, 2);
        assert!(matches!(
            model.fit(&[1.0; 3]),
            Err(PipelineError::InsufficientData { .. })
        ));
    }
}
