//! Adapter fitting one univariate model per series of a feature table.

use crate::core::{Column, FeatureFrame, Forecast};
use crate::error::{PipelineError, Result};
use crate::models::{Forecaster, FrameForecaster};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

struct FittedSeries<F> {
    last_date: NaiveDate,
    model: F,
}

/// Fits a clone of `prototype` to every `unique_id` of a history table.
///
/// Feature columns are ignored; prediction rows are matched to horizon steps
/// by their distance from the series' last observed date.
///
/// # Example
///
/// ```
/// use cafe_forecast::core::{FeatureFrame, Observation, SeriesFrame};
/// use cafe_forecast::models::baseline::Naive;
/// use cafe_forecast::models::{FrameForecaster, PerSeries};
/// use cafe_forecast::features::future_keys;
/// use chrono::NaiveDate;
///
/// let d = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
/// let history = FeatureFrame::from_series(&SeriesFrame::new(vec![
///     Observation::new("Tea", d(1), 3.0),
///     Observation::new("Tea", d(2), 4.0),
/// ]));
///
/// let mut model = PerSeries::new(Naive::new());
/// model.fit(&history).unwrap();
/// let preds = model.predict(&future_keys(&history, 2, 1).unwrap()).unwrap();
/// assert_eq!(preds.column("Naive").unwrap().as_float().unwrap(), &[4.0, 4.0]);
/// ```
pub struct PerSeries<F> {
    prototype: F,
    freq_days: i64,
    fitted: BTreeMap<String, FittedSeries<F>>,
}

impl<F: Forecaster + Clone> PerSeries<F> {
    pub fn new(prototype: F) -> Self {
        Self {
            prototype,
            freq_days: 1,
            fitted: BTreeMap::new(),
        }
    }

    /// Spacing between observations in days (default 1).
    ///
    /// Values below 1 are clamped to 1, since step matching divides by the
    /// spacing.
    pub fn with_freq_days(mut self, freq_days: i64) -> Self {
        self.freq_days = freq_days.max(1);
        self
    }

    /// Number of fitted series.
    pub fn n_series(&self) -> usize {
        self.fitted.len()
    }

    /// Fitted model of one series.
    pub fn model(&self, unique_id: &str) -> Option<&F> {
        self.fitted.get(unique_id).map(|s| &s.model)
    }

    fn step(&self, unique_id: &str, ds: NaiveDate) -> Result<(usize, &FittedSeries<F>)> {
        let series = self.fitted.get(unique_id).ok_or_else(|| {
            PipelineError::Schema(format!("series '{unique_id}' was not in the history table"))
        })?;
        let days = (ds - series.last_date).num_days();
        if days <= 0 || days % self.freq_days != 0 {
            return Err(PipelineError::Schema(format!(
                "date {ds} of '{unique_id}' is not a future step after {}",
                series.last_date
            )));
        }
        Ok(((days / self.freq_days) as usize, series))
    }
}

impl<F: Forecaster + Clone> FrameForecaster for PerSeries<F> {
    fn fit(&mut self, history: &FeatureFrame) -> Result<()> {
        let y = history
            .y()
            .ok_or_else(|| PipelineError::Schema("history table has no 'y' column".to_string()))?;
        if history.is_empty() {
            return Err(PipelineError::EmptyData);
        }

        let mut grouped: BTreeMap<&str, Vec<(NaiveDate, f64)>> = BTreeMap::new();
        for ((id, &ds), &value) in history.unique_id().iter().zip(history.ds()).zip(y) {
            grouped.entry(id.as_str()).or_default().push((ds, value));
        }

        self.fitted.clear();
        for (id, mut points) in grouped {
            points.sort_by_key(|(ds, _)| *ds);
            let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
            let mut model = self.prototype.clone();
            model.fit(&values)?;
            let last_date = points
                .last()
                .map(|(ds, _)| *ds)
                .ok_or(PipelineError::EmptyData)?;
            debug!(model = model.name(), series = id, points = values.len(), "fitted series");
            self.fitted
                .insert(id.to_string(), FittedSeries { last_date, model });
        }
        Ok(())
    }

    fn predict(&self, future: &FeatureFrame) -> Result<FeatureFrame> {
        if self.fitted.is_empty() {
            return Err(PipelineError::FitRequired);
        }

        let mut horizons: BTreeMap<&str, usize> = BTreeMap::new();
        let mut steps = Vec::with_capacity(future.height());
        for (id, &ds) in future.unique_id().iter().zip(future.ds()) {
            let (step, _) = self.step(id, ds)?;
            let h = horizons.entry(id.as_str()).or_default();
            *h = (*h).max(step);
            steps.push(step);
        }

        let mut forecasts: BTreeMap<&str, Forecast> = BTreeMap::new();
        for (id, horizon) in horizons {
            if let Some(series) = self.fitted.get(id) {
                forecasts.insert(id, series.model.predict(horizon)?);
            }
        }

        let mut values = Vec::with_capacity(future.height());
        for (id, step) in future.unique_id().iter().zip(&steps) {
            let value = forecasts
                .get(id.as_str())
                .and_then(|f| f.primary().get(step - 1))
                .copied()
                .ok_or_else(|| {
                    PipelineError::Schema(format!("no forecast for '{id}' at step {step}"))
                })?;
            values.push(value);
        }

        FeatureFrame::from_keys(future.unique_id().to_vec(), future.ds().to_vec())?
            .with_column(self.name(), Column::Float(values))
    }

    fn name(&self) -> &str {
        self.prototype.name()
    }
}
