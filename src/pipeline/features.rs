//! Feature pipeline: ingest, reshape, preprocess, split, build, persist.

use crate::config::PipelineConfig;
use crate::core::SeriesFrame;
use crate::error::{PipelineError, Result};
use crate::features::{FeatureBuilder, FeatureSet};
use crate::io::{future_file_name, history_file_name, read_wide_csv, OutputStage};
use crate::pipeline::PipelineReport;
use crate::split::{split, Splits};
use crate::transform::{preprocess, reshape, PreprocessOptions, WideTable};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// In-memory result of the feature pipeline.
#[derive(Debug, Clone)]
pub struct FeatureRun {
    pub cleaned: SeriesFrame,
    pub splits: Splits,
    pub features: FeatureSet,
    pub report: PipelineReport,
}

/// Reshape a wide table and preprocess it, recording both stages.
///
/// A date that appears twice for the same series is a format error.
pub fn clean(
    wide: &WideTable,
    options: &PreprocessOptions,
    report: &mut PipelineReport,
) -> Result<SeriesFrame> {
    let long = reshape(wide)?;
    report.record("reshape", &long);

    let dupes = long.duplicate_keys();
    if let Some((id, ds)) = dupes.first() {
        warn!(duplicates = dupes.len(), "input repeats (series, date) pairs");
        return Err(PipelineError::Format(format!(
            "series '{id}' has more than one row for {ds} ({} repeated pairs)",
            dupes.len()
        )));
    }

    let cleaned = preprocess(long, options)?;
    report.record("preprocess", &cleaned);
    Ok(cleaned)
}

/// Run every stage up to feature building on an already-read table.
///
/// Configuration is validated and the holiday calendar built before any
/// data is touched.
pub fn build_features(wide: &WideTable, config: &PipelineConfig) -> Result<FeatureRun> {
    config.validate()?;
    let calendar = config.features.calendar()?;
    let builder = FeatureBuilder::new(config.features.builder, &calendar)?;

    let mut report = PipelineReport::new();
    let cleaned = clean(wide, &config.preprocess, &mut report)?;

    let splits = split(&cleaned, &config.split)?;
    for (kind, frame) in splits.iter() {
        report.record(kind.as_str(), frame);
    }

    let features = builder.build(&splits)?;
    info!(tables = features.len(), "built feature variants");

    Ok(FeatureRun {
        cleaned,
        splits,
        features,
        report,
    })
}

/// Write every history and future table to `output_dir`, all or nothing.
pub fn persist_features(features: &FeatureSet, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut stage = OutputStage::create(output_dir)?;
    for (variant, split, tables) in features.iter() {
        stage.write_frame(&history_file_name(variant, split), &tables.history)?;
        if let Some(future) = &tables.future {
            stage.write_frame(&future_file_name(variant, split), future)?;
        }
    }
    stage.commit()
}

/// Full feature run from the configured input file to the output directory.
pub fn run_features(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;
    let wide = read_wide_csv(&config.data.path, &config.data.date_column)?;
    let mut run = build_features(&wide, config)?;
    run.report.files = persist_features(&run.features, &config.data.output_dir)?;
    Ok(run.report)
}
