//! CSV ingestion of the wide input table and persistence of output frames.

pub mod reader;
pub mod writer;

pub use reader::{parse_wide_csv, read_wide_csv};
pub use writer::{write_frame_csv, OutputStage};

use crate::features::FeatureVariant;
use crate::split::SplitKind;

/// `{variant}_{split}.csv`
pub fn history_file_name(variant: FeatureVariant, split: SplitKind) -> String {
    format!("{variant}_{split}.csv")
}

/// `{variant}_{split}_future.csv`
pub fn future_file_name(variant: FeatureVariant, split: SplitKind) -> String {
    format!("{variant}_{split}_future.csv")
}
