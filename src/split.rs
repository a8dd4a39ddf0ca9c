//! Date-boundary train / validation / test partitioning.
//!
//! Rows are assigned by date only, never shuffled, so no observation from a
//! later partition can leak into an earlier one.

use crate::core::SeriesFrame;
use crate::error::{PipelineError, Result};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SplitKind {
    Train,
    Validation,
    Test,
}

impl SplitKind {
    pub const ALL: [SplitKind; 3] = [SplitKind::Train, SplitKind::Validation, SplitKind::Test];

    /// Short name used in output file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitKind::Train => "train",
            SplitKind::Validation => "val",
            SplitKind::Test => "test",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the boundaries are specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SplitPlan {
    /// train: `ds < val_start`; validation: `val_start <= ds < val_end`; test: `ds >= val_end`.
    Dates {
        val_start: NaiveDate,
        val_end: NaiveDate,
    },
    /// Test window of `test_length` days ending on `test_end` (inclusive);
    /// everything before it is train and validation stays empty.
    TestWindow { test_end: NaiveDate, test_length: i64 },
}

impl Default for SplitPlan {
    fn default() -> Self {
        Self::Dates {
            val_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            val_end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
        }
    }
}

impl SplitPlan {
    pub fn dates(val_start: NaiveDate, val_end: NaiveDate) -> Self {
        Self::Dates { val_start, val_end }
    }

    pub fn test_window(test_end: NaiveDate, test_length: i64) -> Self {
        Self::TestWindow {
            test_end,
            test_length,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Dates { val_start, val_end } if val_start >= val_end => {
                Err(PipelineError::Config(format!(
                    "val_start ({val_start}) must be before val_end ({val_end})"
                )))
            }
            Self::TestWindow { test_length, .. } if test_length <= 0 => Err(
                PipelineError::Config(format!("test window length must be positive, got {test_length}")),
            ),
            Self::TestWindow {
                test_end,
                test_length,
            } if window_start(test_end, test_length).is_none() => {
                Err(PipelineError::Config(format!(
                    "test window of {test_length} days ending {test_end} starts before the earliest representable date"
                )))
            }
            _ => Ok(()),
        }
    }

    /// (first validation date, first test date).
    fn boundaries(&self) -> (NaiveDate, NaiveDate) {
        match *self {
            Self::Dates { val_start, val_end } => (val_start, val_end),
            Self::TestWindow {
                test_end,
                test_length,
            } => {
                // validate() rejects windows that leave the date range
                let test_start = window_start(test_end, test_length).unwrap_or(NaiveDate::MIN);
                (test_start, test_start)
            }
        }
    }

    /// Partition a date belongs to.
    pub fn assign(&self, ds: NaiveDate) -> SplitKind {
        let (val_start, test_start) = self.boundaries();
        if ds < val_start {
            SplitKind::Train
        } else if ds < test_start {
            SplitKind::Validation
        } else {
            SplitKind::Test
        }
    }
}

/// First day of a `length`-day window ending on `end`, if representable.
fn window_start(end: NaiveDate, length: i64) -> Option<NaiveDate> {
    Duration::try_days(length.checked_sub(1)?).and_then(|d| end.checked_sub_signed(d))
}

/// The three partitions of one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Splits {
    pub train: SeriesFrame,
    pub validation: SeriesFrame,
    pub test: SeriesFrame,
}

impl Splits {
    pub fn get(&self, kind: SplitKind) -> &SeriesFrame {
        match kind {
            SplitKind::Train => &self.train,
            SplitKind::Validation => &self.validation,
            SplitKind::Test => &self.test,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (SplitKind, &SeriesFrame)> {
        SplitKind::ALL.into_iter().map(move |k| (k, self.get(k)))
    }

    /// Total rows across partitions.
    pub fn total_rows(&self) -> usize {
        self.train.len() + self.validation.len() + self.test.len()
    }
}

/// Partition `frame` by date.
///
/// Boundaries are validated before any row is touched. Rows keep their
/// relative order within each partition.
pub fn split(frame: &SeriesFrame, plan: &SplitPlan) -> Result<Splits> {
    plan.validate()?;

    let mut train = Vec::new();
    let mut validation = Vec::new();
    let mut test = Vec::new();
    for row in frame.iter() {
        match plan.assign(row.ds) {
            SplitKind::Train => train.push(row.clone()),
            SplitKind::Validation => validation.push(row.clone()),
            SplitKind::Test => test.push(row.clone()),
        }
    }

    Ok(Splits {
        train: SeriesFrame::new(train),
        validation: SeriesFrame::new(validation),
        test: SeriesFrame::new(test),
    })
}
