//! Stage summaries collected during a run.

use crate::core::{FrameSummary, SeriesFrame};
use chrono::NaiveDate;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Observational snapshot of the table leaving one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: String,
    pub rows: usize,
    pub series: usize,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl StageSummary {
    pub fn new(stage: impl Into<String>, summary: FrameSummary) -> Self {
        Self {
            stage: stage.into(),
            rows: summary.rows,
            series: summary.series,
            min_date: summary.min_date,
            max_date: summary.max_date,
        }
    }
}

impl fmt::Display for StageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = |d: Option<NaiveDate>| d.map_or_else(|| "-".to_string(), |d| d.to_string());
        write!(
            f,
            "{:<12} rows={:<8} series={:<4} {} .. {}",
            self.stage,
            self.rows,
            self.series,
            date(self.min_date),
            date(self.max_date)
        )
    }
}

/// Stage summaries and written files of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub stages: Vec<StageSummary>,
    pub files: Vec<PathBuf>,
}

impl PipelineReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log the summary of `frame` after `stage`.
    pub fn record(&mut self, stage: &str, frame: &SeriesFrame) -> &StageSummary {
        let summary = StageSummary::new(stage, frame.summary());
        info!(
            stage = %summary.stage,
            rows = summary.rows,
            series = summary.series,
            min_date = ?summary.min_date,
            max_date = ?summary.max_date,
            "stage complete"
        );
        self.stages.push(summary);
        &self.stages[self.stages.len() - 1]
    }

    pub fn stage(&self, name: &str) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == name)
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{stage}")?;
        }
        for file in &self.files {
            writeln!(f, "wrote {}", file.display())?;
        }
        Ok(())
    }
}
