//! Forecast evaluation run: hold out the window before `predict_from`,
//! score candidates against the seasonal naive baseline, then refit on the
//! full history and forecast the horizon.

use crate::config::PipelineConfig;
use crate::core::FeatureFrame;
use crate::error::{PipelineError, Result};
use crate::features::future_keys;
use crate::io::{read_wide_csv, OutputStage};
use crate::models::baseline::{SeasonalNaive, SeasonalWindowAverage};
use crate::models::{FrameForecaster, PerSeries};
use crate::pipeline::{clean, PipelineReport};
use crate::split::{split, SplitPlan};
use crate::transform::{PreprocessOptions, WideTable};
use crate::utils::{evaluate, MetricsTable};
use tracing::info;

/// Predictions on the evaluation window joined with observed values.
pub const TEST_PREDICTIONS_FILE: &str = "script_test_pred.csv";
/// Predictions for the horizon after `predict_from`.
pub const HORIZON_PREDICTIONS_FILE: &str = "script_horizon_pred.csv";
/// Metrics as a markdown table.
pub const METRICS_FILE: &str = "metrics.md";
/// Metrics as CSV.
pub const METRICS_CSV_FILE: &str = "metrics.csv";

/// In-memory result of a forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    /// `{unique_id, ds, y, <model>...}` over the evaluation window.
    pub test_predictions: FeatureFrame,
    /// `{unique_id, ds, <model>...}` over the horizon.
    pub horizon_predictions: FeatureFrame,
    pub metrics: MetricsTable,
    pub report: PipelineReport,
}

/// Baseline first, then candidates.
fn models(config: &PipelineConfig) -> Vec<Box<dyn FrameForecaster>> {
    let p = &config.predictions;
    let freq = config.features.builder.freq_days;
    let baseline: Box<dyn FrameForecaster> =
        Box::new(PerSeries::new(SeasonalNaive::new(p.season_length)).with_freq_days(freq));
    let window: Box<dyn FrameForecaster> = Box::new(
        PerSeries::new(SeasonalWindowAverage::new(p.season_length, p.window)).with_freq_days(freq),
    );
    vec![baseline, window]
}

/// Fit every model on `history` and predict the rows of `future`, one column per model.
fn fit_predict(
    models: &mut [Box<dyn FrameForecaster>],
    history: &FeatureFrame,
    future: &FeatureFrame,
) -> Result<FeatureFrame> {
    let mut out = FeatureFrame::from_keys(future.unique_id().to_vec(), future.ds().to_vec())?;
    for model in models.iter_mut() {
        model.fit(history)?;
        let preds = model.predict(future)?;
        info!(model = model.name(), rows = preds.height(), "predicted");
        out = out.join(&preds)?;
    }
    Ok(out)
}

/// Evaluate and forecast on an already-read table.
pub fn forecast(wide: &WideTable, config: &PipelineConfig) -> Result<ForecastRun> {
    config.validate()?;
    let p = &config.predictions;
    let horizon = p.horizon();

    let options = PreprocessOptions {
        end_date: Some(p.predict_from),
        ..config.preprocess.clone()
    };
    let mut report = PipelineReport::new();
    let cleaned = clean(wide, &options, &mut report)?;
    if cleaned.is_empty() {
        return Err(PipelineError::EmptyData);
    }

    let splits = split(&cleaned, &SplitPlan::test_window(p.predict_from, horizon))?;
    report.record("train", &splits.train);
    report.record("test", &splits.test);
    if splits.train.is_empty() || splits.test.is_empty() {
        return Err(PipelineError::InsufficientData {
            needed: horizon as usize + 1,
            got: cleaned.summary().rows,
        });
    }

    let mut models = models(config);

    let train = FeatureFrame::from_series(&splits.train);
    let truth = FeatureFrame::from_series(&splits.test);
    let test_keys = truth.clone().drop_column("y")?;
    let test_preds = fit_predict(&mut models, &train, &test_keys)?;

    let metrics = evaluate(&truth, &test_preds, &splits.train, p.season_length)?;
    for m in metrics.rows() {
        info!(model = %m.model, mae = m.mae, rmse = m.rmse, smape = m.smape, mase = ?m.mase, "evaluated");
    }
    let test_predictions = truth.join(&test_preds)?;

    let full = FeatureFrame::from_series(&cleaned);
    let horizon_keys = future_keys(&full, horizon as usize, config.features.builder.freq_days)?;
    let horizon_predictions = fit_predict(&mut models, &full, &horizon_keys)?;

    Ok(ForecastRun {
        test_predictions,
        horizon_predictions,
        metrics,
        report,
    })
}

/// Full forecast run writing predictions and metrics to the predictions directory.
pub fn run_forecast(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let wide = read_wide_csv(&config.data.path, &config.data.date_column)?;
    let mut run = forecast(&wide, config)?;

    let mut stage = OutputStage::create(&config.predictions.path)?;
    stage.write_frame(TEST_PREDICTIONS_FILE, &run.test_predictions)?;
    stage.write_text(METRICS_FILE, &run.metrics.to_markdown())?;
    stage.write_text(METRICS_CSV_FILE, &run.metrics.to_csv()?)?;
    stage.write_frame(HORIZON_PREDICTIONS_FILE, &run.horizon_predictions)?;
    run.report.files = stage.commit()?;
    Ok(run.report)
}
