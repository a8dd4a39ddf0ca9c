//! Calendar, seasonality and trend features for the long observation table.
//!
//! # Example
//!
//! ```
//! use cafe_forecast::core::{Observation, SeriesFrame};
//! use cafe_forecast::features::{FeatureBuilder, FeatureConfig, FeatureVariant, HolidayCalendar};
//! use chrono::NaiveDate;
//!
//! let d = |day| NaiveDate::from_ymd_opt(2024, 12, day).unwrap();
//! let split = SeriesFrame::new(vec![
//!     Observation::new("Tea", d(1), 10.0),
//!     Observation::new("Tea", d(2), 12.0),
//! ]);
//!
//! let calendar = HolidayCalendar::us_federal(2024..=2025, &[], d(1), d(31)).unwrap();
//! let config = FeatureConfig { horizon: 7, ..FeatureConfig::default() };
//! let builder = FeatureBuilder::new(config, &calendar).unwrap();
//!
//! let tables = builder.build_split(&split).unwrap();
//! let combined = &tables[&FeatureVariant::Combined];
//! assert_eq!(combined.history.height(), 2);
//! assert_eq!(combined.future.as_ref().unwrap().height(), 7);
//! ```

pub mod builder;
pub mod calendar;
pub mod fourier;
pub mod trend;

pub use builder::{FeatureBuilder, FeatureConfig, FeatureSet, FeatureVariant, VariantTables};
pub use calendar::{
    us_federal_holidays, Holiday, HolidayCalendar, HolidayEntry, HOLIDAY_COLUMNS,
    NO_HOLIDAY_DISTANCE,
};
pub use fourier::{day_index, FourierTerms};
pub use trend::{add_trend, future_keys, TREND_COLUMN};
