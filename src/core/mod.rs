//! Core data structures for the pipeline.

mod feature_frame;
mod forecast;
mod frame;

pub use feature_frame::{Column, FeatureFrame, RESERVED_COLUMNS};
pub use forecast::Forecast;
pub use frame::{FrameSummary, Observation, SeriesFrame};
