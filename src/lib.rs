//! # cafe-forecast
//!
//! Cleaning and feature pipeline for daily café drink pageviews.
//!
//! Reshapes a wide table of per-drink counts into a long `(unique_id, ds, y)`
//! table, caps outliers per series while leaving seasonal specials untouched,
//! partitions by date into train / validation / test, and builds holiday,
//! Fourier and trend feature variants with matching future tables. Baseline
//! forecasters and accuracy metrics consume the resulting tables.

#![allow(clippy::type_complexity)]

pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod split;
pub mod transform;
pub mod utils;

pub use error::{PipelineError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{Column, FeatureFrame, Forecast, Observation, SeriesFrame};
    pub use crate::error::{PipelineError, Result};
    pub use crate::features::{FeatureBuilder, FeatureConfig, FeatureVariant, HolidayCalendar};
    pub use crate::models::{Forecaster, FrameForecaster, PerSeries};
    pub use crate::split::{split, SplitKind, SplitPlan, Splits};
    pub use crate::transform::{cap_outliers, preprocess, reshape, CapStrategy, PreprocessOptions};
    pub use crate::utils::{evaluate, MetricsTable};
}
