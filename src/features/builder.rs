//! Feature Builder: one history table and an optional future table per
//! feature variant and split.

use crate::core::{FeatureFrame, SeriesFrame};
use crate::error::{PipelineError, Result};
use crate::features::calendar::HolidayCalendar;
use crate::features::fourier::FourierTerms;
use crate::features::trend::{add_trend, future_keys, TREND_COLUMN};
use crate::split::{SplitKind, Splits};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Named combination of regressor columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureVariant {
    None,
    Holidays,
    Fourier,
    Trend,
    /// Holidays, Fourier terms and trend together.
    Combined,
}

impl FeatureVariant {
    pub const ALL: [FeatureVariant; 5] = [
        FeatureVariant::None,
        FeatureVariant::Holidays,
        FeatureVariant::Fourier,
        FeatureVariant::Trend,
        FeatureVariant::Combined,
    ];

    /// File name prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureVariant::None => "none",
            FeatureVariant::Holidays => "holidays",
            FeatureVariant::Fourier => "fourier",
            FeatureVariant::Trend => "trend",
            FeatureVariant::Combined => "fourier+trend+holidays",
        }
    }
}

impl fmt::Display for FeatureVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters passed explicitly to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Future days per series.
    pub horizon: usize,
    /// Seasonal period in days.
    pub season_length: usize,
    /// Number of Fourier harmonics.
    pub fourier_terms: usize,
    /// Spacing between observations in days.
    pub freq_days: i64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            horizon: 31,
            season_length: 7,
            fourier_terms: 3,
            freq_days: 1,
        }
    }
}

impl FeatureConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(PipelineError::Config("horizon must be positive".to_string()));
        }
        if self.freq_days <= 0 {
            return Err(PipelineError::Config(format!(
                "frequency must be a positive number of days, got {}",
                self.freq_days
            )));
        }
        FourierTerms::new(self.season_length, self.fourier_terms).map(|_| ())
    }
}

/// History table and, except for [`FeatureVariant::None`], its future table.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTables {
    pub history: FeatureFrame,
    pub future: Option<FeatureFrame>,
}

/// All variant tables of all splits.
#[derive(Debug, Clone, Default)]
pub struct FeatureSet {
    tables: BTreeMap<(FeatureVariant, SplitKind), VariantTables>,
}

impl FeatureSet {
    pub fn get(&self, variant: FeatureVariant, split: SplitKind) -> Option<&VariantTables> {
        self.tables.get(&(variant, split))
    }

    /// Entries ordered by variant, then split.
    pub fn iter(&self) -> impl Iterator<Item = (FeatureVariant, SplitKind, &VariantTables)> {
        self.tables.iter().map(|((v, s), t)| (*v, *s, t))
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Builds every feature variant for a split table.
#[derive(Debug, Clone)]
pub struct FeatureBuilder<'a> {
    config: FeatureConfig,
    fourier: FourierTerms,
    calendar: &'a HolidayCalendar,
}

impl<'a> FeatureBuilder<'a> {
    pub fn new(config: FeatureConfig, calendar: &'a HolidayCalendar) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            fourier: FourierTerms::new(config.season_length, config.fourier_terms)?,
            calendar,
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Build the five variants for one split table.
    ///
    /// Day indices for Fourier terms and trend are measured from the split's
    /// first date and shared by the history and future tables.
    pub fn build_split(&self, frame: &SeriesFrame) -> Result<BTreeMap<FeatureVariant, VariantTables>> {
        let base = FeatureFrame::from_series(frame);
        let origin = base.first_date().unwrap_or_default();
        let keys = future_keys(&base, self.config.horizon, self.config.freq_days)?;

        let fourier_history = self.fourier.annotate(base.clone(), origin)?;
        let fourier_future = self.fourier.annotate(keys.clone(), origin)?;

        let trend_history = add_trend(base.clone(), origin)?;
        let trend_future = add_trend(keys, origin)?;

        let holiday_history = self.calendar.annotate(base.clone())?;
        let holiday_future = self
            .calendar
            .annotate(trend_future.clone().drop_column(TREND_COLUMN)?)?;

        let combined_history = holiday_history
            .clone()
            .join(&fourier_history.clone().drop_column("y")?)?
            .join(&trend_history.clone().drop_column("y")?)?;
        let combined_future = holiday_future
            .clone()
            .join(&fourier_future)?
            .join(&trend_future)?;

        let mut out = BTreeMap::new();
        out.insert(
            FeatureVariant::None,
            VariantTables {
                history: base,
                future: None,
            },
        );
        out.insert(
            FeatureVariant::Holidays,
            VariantTables {
                history: holiday_history,
                future: Some(holiday_future),
            },
        );
        out.insert(
            FeatureVariant::Fourier,
            VariantTables {
                history: fourier_history,
                future: Some(fourier_future),
            },
        );
        out.insert(
            FeatureVariant::Trend,
            VariantTables {
                history: trend_history,
                future: Some(trend_future),
            },
        );
        out.insert(
            FeatureVariant::Combined,
            VariantTables {
                history: combined_history,
                future: Some(combined_future),
            },
        );

        for (variant, tables) in &out {
            self.check_shape(*variant, frame, tables)?;
        }
        Ok(out)
    }

    /// Build every variant for every split.
    pub fn build(&self, splits: &Splits) -> Result<FeatureSet> {
        let mut set = FeatureSet::default();
        for (kind, frame) in splits.iter() {
            for (variant, tables) in self.build_split(frame)? {
                debug!(
                    variant = variant.as_str(),
                    split = kind.as_str(),
                    history_rows = tables.history.height(),
                    future_rows = tables.future.as_ref().map_or(0, |f| f.height()),
                    "built feature table"
                );
                set.tables.insert((variant, kind), tables);
            }
        }
        Ok(set)
    }

    fn check_shape(
        &self,
        variant: FeatureVariant,
        frame: &SeriesFrame,
        tables: &VariantTables,
    ) -> Result<()> {
        if tables.history.height() != frame.len() || !tables.history.has_target() {
            return Err(PipelineError::Schema(format!(
                "{variant} history has {} rows, split has {}",
                tables.history.height(),
                frame.len()
            )));
        }
        if let Some(future) = &tables.future {
            let expected = self.config.horizon * frame.n_series();
            if future.height() != expected || future.has_target() {
                return Err(PipelineError::Schema(format!(
                    "{variant} future has {} rows, expected {expected}",
                    future.height()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;
    use crate::features::calendar::HOLIDAY_COLUMNS;
    use approx::assert_abs_diff_eq;
    use chrono::{Duration, NaiveDate};
    use std::collections::HashSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn calendar() -> HolidayCalendar {
        HolidayCalendar::us_federal(2023..=2025, &[], date(2023, 1, 1), date(2025, 12, 31)).unwrap()
    }

    fn frame(days: i64) -> SeriesFrame {
        let start = date(2024, 11, 20);
        ["Coffee", "Tea"]
            .iter()
            .flat_map(|id| {
                (0..days).map(move |i| Observation::new(*id, start + Duration::days(i), i as f64))
            })
            .collect()
    }

    fn config(horizon: usize) -> FeatureConfig {
        FeatureConfig {
            horizon,
            ..FeatureConfig::default()
        }
    }

    #[test]
    fn variant_names_match_file_prefixes() {
        let names: Vec<_> = FeatureVariant::ALL.iter().map(|v| v.as_str()).collect();
        assert_eq!(
            names,
            vec!["none", "holidays", "fourier", "trend", "fourier+trend+holidays"]
        );
    }

    #[test]
    fn every_variant_has_expected_row_counts() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(5), &cal).unwrap();
        let split = frame(10);
        let tables = builder.build_split(&split).unwrap();

        assert_eq!(tables.len(), 5);
        for (variant, t) in &tables {
            assert_eq!(t.history.height(), 20, "{variant}");
            match variant {
                FeatureVariant::None => assert!(t.future.is_none()),
                _ => assert_eq!(t.future.as_ref().unwrap().height(), 10, "{variant}"),
            }
        }
    }

    #[test]
    fn combined_has_each_feature_once_and_keeps_target() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(3), &cal).unwrap();
        let tables = builder.build_split(&frame(4)).unwrap();
        let combined = &tables[&FeatureVariant::Combined];

        let names = combined.history.column_names();
        let unique: HashSet<_> = names.iter().collect();
        assert_eq!(unique.len(), names.len());
        assert!(names.contains(&"y"));
        for col in HOLIDAY_COLUMNS {
            assert!(names.contains(&col));
        }
        assert!(names.contains(&"sin3_7") && names.contains(&"cos1_7"));
        assert!(names.contains(&TREND_COLUMN));
        assert_eq!(names.len(), 3 + 5 + 6 + 1);

        let future_names = combined.future.as_ref().unwrap().column_names();
        assert_eq!(future_names.len(), 2 + 5 + 6 + 1);
        assert_eq!(
            future_names.iter().filter(|n| **n == TREND_COLUMN).count(),
            1
        );
    }

    #[test]
    fn holiday_future_has_no_trend_column() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(3), &cal).unwrap();
        let tables = builder.build_split(&frame(4)).unwrap();
        let future = tables[&FeatureVariant::Holidays].future.as_ref().unwrap();
        assert_eq!(future.feature_names(), HOLIDAY_COLUMNS.to_vec());
    }

    #[test]
    fn future_holidays_are_flagged() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(10), &cal).unwrap();
        // history ends 2024-11-27, Thanksgiving is 2024-11-28
        let tables = builder.build_split(&frame(8)).unwrap();
        let future = tables[&FeatureVariant::Holidays].future.as_ref().unwrap();
        let flags = future.column("is_holiday").unwrap().as_bool().unwrap();
        assert!(flags[0]);
        assert!(!flags[1]);
    }

    #[test]
    fn empty_split_yields_empty_tables() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(3), &cal).unwrap();
        let tables = builder.build_split(&SeriesFrame::empty()).unwrap();
        for t in tables.values() {
            assert!(t.history.is_empty());
            assert!(t.future.as_ref().map_or(true, |f| f.is_empty()));
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let cal = calendar();
        for cfg in [
            config(0),
            FeatureConfig {
                season_length: 0,
                ..FeatureConfig::default()
            },
            FeatureConfig {
                freq_days: 0,
                ..FeatureConfig::default()
            },
        ] {
            assert!(matches!(
                FeatureBuilder::new(cfg, &cal),
                Err(PipelineError::Config(_))
            ));
        }
    }

    fn fourier_row(frame: &FeatureFrame, terms: &FourierTerms, row: usize) -> Vec<f64> {
        terms
            .column_names()
            .iter()
            .map(|name| frame.column(name).unwrap().as_float().unwrap()[row])
            .collect()
    }

    #[test]
    fn fourier_future_continues_history_phase() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(10), &cal).unwrap();
        // both series span t = 1..=10, Coffee rows come first
        let tables = builder.build_split(&frame(10)).unwrap();
        let fourier = &tables[&FeatureVariant::Fourier];
        let history = &fourier.history;
        let future = fourier.future.as_ref().unwrap();
        let terms = &builder.fourier;

        let first_step = fourier_row(future, terms, 0);
        for (got, want) in first_step.iter().zip(terms.evaluate(11.0)) {
            assert_abs_diff_eq!(*got, want, epsilon = 1e-12);
        }

        // history t = 5 and future t = 12 are one season apart
        let h = fourier_row(history, terms, 4);
        let f = fourier_row(future, terms, 1);
        for (a, b) in h.iter().zip(&f) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }

        // same for the second series
        let h = fourier_row(history, terms, 10 + 9);
        let f = fourier_row(future, terms, 10 + 6);
        for (a, b) in h.iter().zip(&f) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
        }
    }

    #[test]
    fn frequency_past_the_date_range_is_a_config_error() {
        let cal = calendar();
        let cfg = FeatureConfig {
            horizon: 2,
            freq_days: 1_000_000_000,
            ..FeatureConfig::default()
        };
        let builder = FeatureBuilder::new(cfg, &cal).unwrap();
        assert!(matches!(
            builder.build_split(&frame(3)),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn build_covers_every_variant_and_split() {
        let cal = calendar();
        let builder = FeatureBuilder::new(config(2), &cal).unwrap();
        let splits = Splits {
            train: frame(3),
            validation: SeriesFrame::empty(),
            test: frame(2),
        };
        let set = builder.build(&splits).unwrap();
        assert_eq!(set.len(), 15);
        let trend_test = set.get(FeatureVariant::Trend, SplitKind::Test).unwrap();
        assert_eq!(trend_test.history.height(), 4);
        assert_eq!(trend_test.future.as_ref().unwrap().height(), 4);
    }
}
