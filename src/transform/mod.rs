//! Data cleaning transforms for the long observation table.
//!
//! Provides wide-to-long reshaping, per-series outlier capping and the
//! preprocessing step that exempts named series from capping.
//!
//! # Example
//!
//! ```
//! use cafe_forecast::transform::{preprocess, reshape, PreprocessOptions, WideTable};
//!
//! let wide = WideTable::new(
//!     "Date",
//!     vec!["2024-01-01".into(), "2024-01-02".into()],
//!     vec![
//!         ("Coffee".into(), vec![20.0, 21.0]),
//!         ("Pumpkin spice latte".into(), vec![5.0, 500.0]),
//!     ],
//! )
//! .unwrap();
//!
//! let long = reshape(&wide).unwrap();
//! let clean = preprocess(long, &PreprocessOptions::default()).unwrap();
//! assert_eq!(clean.len(), 4);
//! ```

pub mod capping;
pub mod preprocess;
pub mod reshape;

pub use capping::{cap_outliers, compute_bounds, Bounds, CapStrategy, CappedFrame};
pub use preprocess::{preprocess, reinsert, split_exempt, PreprocessOptions, DEFAULT_EXEMPT_SERIES};
pub use reshape::{parse_date, reshape, WideTable};
