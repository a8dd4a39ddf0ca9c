//! Fourier seasonality regressors.
//!
//! Terms are evaluated on a day index measured from a fixed origin date, so a
//! history table and its future table built from the same origin are
//! phase-consistent.

use crate::core::{Column, FeatureFrame};
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::f64::consts::PI;

/// Day index of `ds` relative to `origin`; the origin itself is day 1.
pub fn day_index(ds: NaiveDate, origin: NaiveDate) -> f64 {
    ((ds - origin).num_days() + 1) as f64
}

/// Sine/cosine pairs for `terms` harmonics of a `season_length`-day cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourierTerms {
    season_length: usize,
    terms: usize,
}

impl FourierTerms {
    pub fn new(season_length: usize, terms: usize) -> Result<Self> {
        if season_length == 0 {
            return Err(PipelineError::Config(
                "season length must be positive".to_string(),
            ));
        }
        if terms == 0 {
            return Err(PipelineError::Config(
                "number of fourier terms must be positive".to_string(),
            ));
        }
        Ok(Self {
            season_length,
            terms,
        })
    }

    pub fn season_length(&self) -> usize {
        self.season_length
    }

    pub fn terms(&self) -> usize {
        self.terms
    }

    /// Column names: `sin1_7, sin2_7, ..., cos1_7, cos2_7, ...`.
    pub fn column_names(&self) -> Vec<String> {
        let p = self.season_length;
        let sines = (1..=self.terms).map(|k| format!("sin{k}_{p}"));
        let cosines = (1..=self.terms).map(|k| format!("cos{k}_{p}"));
        sines.chain(cosines).collect()
    }

    /// Values of every column at day index `t`, in [`FourierTerms::column_names`] order.
    pub fn evaluate(&self, t: f64) -> Vec<f64> {
        let p = self.season_length as f64;
        let angle = |k: usize| 2.0 * PI * k as f64 * t / p;
        let sines = (1..=self.terms).map(|k| angle(k).sin());
        let cosines = (1..=self.terms).map(|k| angle(k).cos());
        sines.chain(cosines).collect()
    }

    /// Append the Fourier columns to `frame`, with `t` measured from `origin`.
    pub fn annotate(&self, mut frame: FeatureFrame, origin: NaiveDate) -> Result<FeatureFrame> {
        let names = self.column_names();
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(frame.height()); names.len()];
        for &ds in frame.ds() {
            for (col, v) in columns.iter_mut().zip(self.evaluate(day_index(ds, origin))) {
                col.push(v);
            }
        }
        for (name, values) in names.into_iter().zip(columns) {
            frame.push_column(name, Column::Float(values))?;
        }
        Ok(frame)
    }
}
