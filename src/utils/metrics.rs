//! Accuracy metrics for forecast evaluation.

use crate::core::{FeatureFrame, SeriesFrame};
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

/// Calculate MAE between two slices.
pub fn mae(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate MSE between two slices.
pub fn mse(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum::<f64>()
        / actual.len() as f64
}

/// Calculate RMSE between two slices.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> f64 {
    mse(actual, predicted).sqrt()
}

/// Calculate SMAPE (percent) between two slices.
pub fn smape(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.len() != predicted.len() || actual.is_empty() {
        return f64::NAN;
    }
    let n = actual.len() as f64;
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| {
            let denom = a.abs() + p.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - p).abs() / denom
            }
        })
        .sum::<f64>()
        * 100.0
        / n
}

/// In-sample MAE of the seasonal naive forecast, the MASE denominator.
///
/// `None` when the history is not longer than one period or the scale is zero.
pub fn seasonal_naive_scale(insample: &[f64], period: usize) -> Option<f64> {
    let period = period.max(1);
    let n = insample.len();
    if n <= period {
        return None;
    }
    let scale = insample
        .iter()
        .skip(period)
        .zip(insample)
        .map(|(curr, prev)| (curr - prev).abs())
        .sum::<f64>()
        / (n - period) as f64;
    (scale > 0.0).then_some(scale)
}

/// MASE of one series: forecast MAE over the in-sample seasonal naive MAE.
pub fn mase(actual: &[f64], predicted: &[f64], insample: &[f64], period: usize) -> Option<f64> {
    let scale = seasonal_naive_scale(insample, period)?;
    let err = mae(actual, predicted);
    err.is_finite().then(|| err / scale)
}

/// Accuracy of one model across all evaluated series.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetrics {
    pub model: String,
    pub mae: f64,
    pub rmse: f64,
    pub smape: f64,
    /// Mean of per-series MASE over series with a defined scale.
    pub mase: Option<f64>,
    /// Number of evaluated rows.
    pub rows: usize,
}

/// One [`ModelMetrics`] row per prediction column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsTable {
    rows: Vec<ModelMetrics>,
}

impl MetricsTable {
    pub fn rows(&self) -> &[ModelMetrics] {
        &self.rows
    }

    pub fn get(&self, model: &str) -> Option<&ModelMetrics> {
        self.rows.iter().find(|r| r.model == model)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render as a markdown table.
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("| model | MAE | RMSE | SMAPE | MASE |\n|---|---|---|---|---|\n");
        for r in &self.rows {
            let mase = r.mase.map_or_else(|| "n/a".to_string(), |m| format!("{m:.4}"));
            let _ = writeln!(
                out,
                "| {} | {:.4} | {:.4} | {:.4} | {} |",
                r.model, r.mae, r.rmse, r.smape, mase
            );
        }
        out
    }

    /// Render as CSV with header `model,mae,rmse,smape,mase`.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["model", "mae", "rmse", "smape", "mase"])?;
        for r in &self.rows {
            writer.write_record([
                r.model.clone(),
                r.mae.to_string(),
                r.rmse.to_string(),
                r.smape.to_string(),
                r.mase.map(|m| m.to_string()).unwrap_or_default(),
            ])?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PipelineError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Csv(e.to_string()))
    }
}

/// Score every float column of `predictions` against `truth`.
///
/// `truth` must carry `y`; every prediction key `(unique_id, ds)` must be
/// present in it exactly once. `insample` supplies the per-series history
/// used to scale MASE with a seasonal naive of `period`.
pub fn evaluate(
    truth: &FeatureFrame,
    predictions: &FeatureFrame,
    insample: &SeriesFrame,
    period: usize,
) -> Result<MetricsTable> {
    let y = truth
        .y()
        .ok_or_else(|| PipelineError::Schema("truth table has no 'y' column".to_string()))?;

    let mut index: HashMap<(&str, NaiveDate), usize> = HashMap::with_capacity(truth.height());
    for (i, (id, &ds)) in truth.unique_id().iter().zip(truth.ds()).enumerate() {
        if index.insert((id.as_str(), ds), i).is_some() {
            return Err(PipelineError::Schema(format!(
                "duplicate truth key ({id}, {ds})"
            )));
        }
    }

    let mut actual = Vec::with_capacity(predictions.height());
    for (id, &ds) in predictions.unique_id().iter().zip(predictions.ds()) {
        let i = index.get(&(id.as_str(), ds)).ok_or_else(|| {
            PipelineError::Schema(format!("prediction key ({id}, {ds}) has no observed value"))
        })?;
        actual.push(y[*i]);
    }

    let insample_by_series: BTreeMap<&str, Vec<f64>> = insample
        .group_indices()
        .into_iter()
        .map(|(id, idx)| (id, idx.iter().map(|&i| insample.rows()[i].y).collect()))
        .collect();

    let mut rows = Vec::new();
    for (name, column) in predictions.columns() {
        let Some(predicted) = column.as_float() else {
            continue;
        };

        let mut per_series: BTreeMap<&str, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for ((id, a), p) in predictions.unique_id().iter().zip(&actual).zip(predicted) {
            let entry = per_series.entry(id.as_str()).or_default();
            entry.0.push(*a);
            entry.1.push(*p);
        }
        let scaled: Vec<f64> = per_series
            .iter()
            .filter_map(|(id, (a, p))| {
                insample_by_series
                    .get(id)
                    .and_then(|hist| mase(a, p, hist, period))
            })
            .collect();

        rows.push(ModelMetrics {
            model: name.clone(),
            mae: mae(&actual, predicted),
            rmse: rmse(&actual, predicted),
            smape: smape(&actual, predicted),
            mase: (!scaled.is_empty()).then(|| scaled.iter().sum::<f64>() / scaled.len() as f64),
            rows: actual.len(),
        });
    }

    if rows.is_empty() {
        return Err(PipelineError::Schema(
            "prediction table has no numeric prediction columns".to_string(),
        ));
    }
    Ok(MetricsTable { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, Observation};
    use approx::assert_relative_eq;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[test]
    fn slice_metrics() {
        let actual = [1.0, 2.0, 3.0, 4.0];
        let predicted = [2.0, 2.0, 2.0, 2.0];
        assert_relative_eq!(mae(&actual, &predicted), 1.0);
        assert_relative_eq!(mse(&actual, &predicted), 1.5);
        assert_relative_eq!(rmse(&actual, &predicted), 1.5_f64.sqrt());
        assert_relative_eq!(smape(&[0.0], &[0.0]), 0.0);
        assert_relative_eq!(smape(&[1.0], &[3.0]), 100.0);
        assert!(mae(&actual, &predicted[..2]).is_nan());
    }

    #[test]
    fn mase_scales_by_seasonal_naive() {
        let insample = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(seasonal_naive_scale(&insample, 1), Some(1.0));
        assert_eq!(seasonal_naive_scale(&insample, 2), Some(2.0));
        assert_eq!(seasonal_naive_scale(&[3.0, 3.0, 3.0], 1), None);
        assert_eq!(seasonal_naive_scale(&[1.0], 1), None);
        assert_relative_eq!(mase(&[6.0], &[8.0], &insample, 2).unwrap(), 1.0);
    }

    fn truth() -> FeatureFrame {
        FeatureFrame::from_series(&SeriesFrame::new(vec![
            Observation::new("Tea", date(1), 10.0),
            Observation::new("Tea", date(2), 20.0),
        ]))
    }

    fn train() -> SeriesFrame {
        SeriesFrame::new(vec![
            Observation::new("Tea", date(1) - chrono::Duration::days(2), 5.0),
            Observation::new("Tea", date(1) - chrono::Duration::days(1), 10.0),
        ])
    }

    #[test]
    fn evaluate_scores_each_prediction_column() {
        let preds = FeatureFrame::from_keys(vec!["Tea".into(); 2], vec![date(1), date(2)])
            .unwrap()
            .with_column("SeasonalNaive", Column::Float(vec![10.0, 10.0]))
            .unwrap()
            .with_column("Perfect", Column::Float(vec![10.0, 20.0]))
            .unwrap();

        let table = evaluate(&truth(), &preds, &train(), 1).unwrap();
        assert_eq!(table.rows().len(), 2);
        let naive = table.get("SeasonalNaive").unwrap();
        assert_relative_eq!(naive.mae, 5.0);
        assert_relative_eq!(naive.mase.unwrap(), 1.0);
        assert_eq!(naive.rows, 2);
        assert_relative_eq!(table.get("Perfect").unwrap().rmse, 0.0);

        let md = table.to_markdown();
        assert!(md.starts_with("| model | MAE"));
        assert!(md.contains("| SeasonalNaive | 5.0000 |"));
        let csv = table.to_csv().unwrap();
        assert!(csv.starts_with("model,mae,rmse,smape,mase\n"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn prediction_without_truth_is_a_schema_error() {
        let preds = FeatureFrame::from_keys(vec!["Tea".into()], vec![date(3)])
            .unwrap()
            .with_column("SeasonalNaive", Column::Float(vec![1.0]))
            .unwrap();
        let err = evaluate(&truth(), &preds, &train(), 1).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }

    #[test]
    fn truth_without_target_is_a_schema_error() {
        let keys = FeatureFrame::from_keys(vec!["Tea".into()], vec![date(1)]).unwrap();
        let preds = keys
            .clone()
            .with_column("SeasonalNaive", Column::Float(vec![1.0]))
            .unwrap();
        assert!(matches!(
            evaluate(&keys, &preds, &train(), 1),
            Err(PipelineError::Schema(_))
        ));
    }
}
