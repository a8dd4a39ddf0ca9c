//! Stage orchestration.
//!
//! Stages run strictly in sequence and hand ownership of the table to the
//! next stage. Any error aborts the run before output is committed.

mod features;
mod forecast;
mod report;

pub use features::{build_features, clean, persist_features, run_features, FeatureRun};
pub use forecast::{
    forecast, run_forecast, ForecastRun, HORIZON_PREDICTIONS_FILE, METRICS_CSV_FILE, METRICS_FILE,
    TEST_PREDICTIONS_FILE,
};
pub use report::{PipelineReport, StageSummary};
