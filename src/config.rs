//! TOML configuration for pipeline runs.
//!
//! Every section is optional; missing keys take the defaults below. Dates
//! are quoted ISO strings (`"2024-01-01"`).
//!
//! ```toml
//! [data]
//! path = "data/drink_pageviews.csv"
//! date_column = "Date"
//! output_dir = "data/processed_data"
//!
//! [preprocess]
//! exempt_series = ["Pumpkin spice latte"]
//! strategy = { method = "iqr", factor = 1.5 }
//!
//! [split]
//! val_start = "2024-01-01"
//! val_end = "2025-01-01"
//!
//! [features]
//! horizon = 31
//! season_length = 7
//! fourier_terms = 3
//!
//! [predictions]
//! predict_from = "2026-01-01"
//! predict_until = "2026-01-31"
//! path = "predictions"
//! ```

use crate::error::{PipelineError, Result};
use crate::features::{FeatureConfig, Holiday, HolidayCalendar};
use crate::split::SplitPlan;
use crate::transform::PreprocessOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CAFE_FORECAST_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG: &str = "config.toml";

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Wide input CSV.
    pub path: PathBuf,
    /// Name of the date column in the input.
    pub date_column: String,
    /// Directory receiving the feature tables.
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/drink_pageviews.csv"),
            date_column: "Date".to_string(),
            output_dir: PathBuf::from("data/processed_data"),
        }
    }
}

/// Feature Builder parameters plus the holiday calendar definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    #[serde(flatten)]
    pub builder: FeatureConfig,
    /// First day of the precomputed holiday table.
    pub holiday_start: NaiveDate,
    /// Last day of the precomputed holiday table.
    pub holiday_end: NaiveDate,
    /// First and last year (inclusive) of US federal holidays.
    pub holiday_years: [i32; 2],
    /// Additional named holidays, e.g. promotions.
    pub extra_holidays: Vec<Holiday>,
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            builder: FeatureConfig::default(),
            holiday_start: ymd(2020, 7, 1),
            holiday_end: ymd(2026, 1, 31),
            holiday_years: [2020, 2026],
            extra_holidays: Vec::new(),
        }
    }
}

impl FeaturesConfig {
    /// Build the holiday calendar described by this section.
    pub fn calendar(&self) -> Result<HolidayCalendar> {
        let [first, last] = self.holiday_years;
        HolidayCalendar::us_federal(
            first..=last,
            &self.extra_holidays,
            self.holiday_start,
            self.holiday_end,
        )
    }
}

/// Forecast evaluation run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionsConfig {
    /// Last observed day used; the evaluation window ends here.
    pub predict_from: NaiveDate,
    /// Last forecast day; the horizon is the day count from `predict_from`.
    pub predict_until: NaiveDate,
    /// Directory receiving predictions and metrics.
    pub path: PathBuf,
    /// Seasonal period of the baseline and of the MASE scale.
    pub season_length: usize,
    /// Cycles averaged by the seasonal window model.
    pub window: usize,
}

impl Default for PredictionsConfig {
    fn default() -> Self {
        Self {
            predict_from: ymd(2026, 1, 1),
            predict_until: ymd(2026, 1, 31),
            path: PathBuf::from("predictions"),
            season_length: 7,
            window: 4,
        }
    }
}

impl PredictionsConfig {
    /// Days between `predict_from` and `predict_until`.
    pub fn horizon(&self) -> i64 {
        (self.predict_until - self.predict_from).num_days()
    }
}

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data: DataConfig,
    pub preprocess: PreprocessOptions,
    pub split: SplitPlan,
    pub features: FeaturesConfig,
    pub predictions: PredictionsConfig,
}

impl PipelineConfig {
    /// Load configuration using the search order:
    /// 1. `explicit` path (e.g. `--config`)
    /// 2. `$CAFE_FORECAST_CONFIG`
    /// 3. `./config.toml`
    /// 4. Built-in defaults
    ///
    /// A file that exists but fails to parse or validate is an error, never
    /// silently replaced by defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::load_from_file(path)?;
            info!(path = %path.display(), "loaded config from command line");
            return Ok(config);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let p = PathBuf::from(&path);
            if p.exists() {
                let config = Self::load_from_file(&p)?;
                info!(path = %p.display(), "loaded config from {CONFIG_ENV}");
                return Ok(config);
            }
            warn!(path = %path, "{CONFIG_ENV} points to a non-existent file, falling back");
        }

        let local = PathBuf::from(LOCAL_CONFIG);
        if local.exists() {
            let config = Self::load_from_file(&local)?;
            info!("loaded config from ./{LOCAL_CONFIG}");
            return Ok(config);
        }

        info!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load and validate a specific TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.data.date_column.trim().is_empty() {
            return Err(PipelineError::Config("date column name is empty".to_string()));
        }
        self.preprocess.strategy.validate()?;
        self.split.validate()?;
        self.features.builder.validate()?;

        if self.features.holiday_start > self.features.holiday_end {
            return Err(PipelineError::Config(format!(
                "holiday_start ({}) is after holiday_end ({})",
                self.features.holiday_start, self.features.holiday_end
            )));
        }
        let [first, last] = self.features.holiday_years;
        if first > last {
            return Err(PipelineError::Config(format!(
                "holiday_years [{first}, {last}] is not ascending"
            )));
        }

        let p = &self.predictions;
        if p.predict_from >= p.predict_until {
            return Err(PipelineError::Config(format!(
                "predict_from ({}) must be before predict_until ({})",
                p.predict_from, p.predict_until
            )));
        }
        if p.season_length == 0 || p.window == 0 {
            return Err(PipelineError::Config(
                "prediction season_length and window must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PipelineError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::CapStrategy;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.data.date_column, "Date");
        assert_eq!(config.preprocess.exempt_series, vec!["Pumpkin spice latte"]);
        assert_eq!(config.features.builder.season_length, 7);
        assert_eq!(config.predictions.horizon(), 30);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [preprocess]
            strategy = { method = "zscore", threshold = 2.5 }

            [features]
            horizon = 14
            extra_holidays = [{ date = "2024-10-01", name = "Coffee Day" }]
            "#,
        )
        .unwrap();
        assert_eq!(config.preprocess.strategy, CapStrategy::z_score(2.5));
        assert_eq!(config.preprocess.exempt_series, vec!["Pumpkin spice latte"]);
        assert_eq!(config.features.builder.horizon, 14);
        assert_eq!(config.features.builder.fourier_terms, 3);
        assert_eq!(config.features.extra_holidays.len(), 1);
        assert_eq!(config.split, SplitPlan::default());
    }

    #[test]
    fn calendar_includes_extra_holidays() {
        let mut config = PipelineConfig::default();
        config.features.extra_holidays = vec![Holiday::new(ymd(2024, 10, 1), "Coffee Day")];
        let cal = config.features.calendar().unwrap();
        assert_eq!(cal.entry(ymd(2024, 10, 1)).holiday_name, "Coffee Day");
        assert!(cal.is_holiday(ymd(2024, 7, 4)));
    }

    #[test]
    fn validation_rejects_bad_settings() {
        let mut bad = Vec::new();

        let mut c = PipelineConfig::default();
        c.split = SplitPlan::dates(ymd(2025, 1, 1), ymd(2024, 1, 1));
        bad.push(c);

        let mut c = PipelineConfig::default();
        c.features.builder.horizon = 0;
        bad.push(c);

        let mut c = PipelineConfig::default();
        c.preprocess.strategy = CapStrategy::percentile(50.0, 10.0);
        bad.push(c);

        let mut c = PipelineConfig::default();
        c.predictions.predict_until = c.predictions.predict_from;
        bad.push(c);

        let mut c = PipelineConfig::default();
        c.features.holiday_end = ymd(2019, 1, 1);
        bad.push(c);

        for c in bad {
            assert!(matches!(c.validate(), Err(PipelineError::Config(_))), "{c:?}");
        }
    }

    #[test]
    fn explicit_path_is_loaded_and_validated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[split]\nval_start = \"2023-06-01\"\nval_end = \"2024-06-01\"").unwrap();
        let config = PipelineConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.split, SplitPlan::dates(ymd(2023, 6, 1), ymd(2024, 6, 1)));

        let mut invalid = tempfile::NamedTempFile::new().unwrap();
        writeln!(invalid, "[features]\nhorizon = 0").unwrap();
        assert!(matches!(
            PipelineConfig::load(Some(invalid.path())),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let err = PipelineConfig::load(Some(Path::new("/no/such/config.toml"))).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn round_trips_through_toml() {
        let config = PipelineConfig::default();
        let text = config.to_toml().unwrap();
        let back: PipelineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
