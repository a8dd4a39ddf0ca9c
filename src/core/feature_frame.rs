//! Keyed columnar table used for feature variants, future tables and predictions.

use crate::core::SeriesFrame;
use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Names that cannot be used for feature columns.
pub const RESERVED_COLUMNS: [&str; 3] = ["unique_id", "ds", "y"];

/// A typed feature column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Bool(Vec<bool>),
    Text(Vec<String>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Bool(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render one cell as text for persistence.
    pub fn render(&self, row: usize) -> String {
        match self {
            Column::Float(v) => v[row].to_string(),
            Column::Int(v) => v[row].to_string(),
            Column::Bool(v) => v[row].to_string(),
            Column::Text(v) => v[row].clone(),
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            Column::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<&[bool]> {
        match self {
            Column::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
            Column::Bool(v) => Column::Bool(indices.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
        }
    }
}

/// Table keyed by `(unique_id, ds)` with an optional target `y` and named
/// feature columns.
///
/// History tables carry `y`; future and prediction tables do not.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    unique_id: Vec<String>,
    ds: Vec<NaiveDate>,
    y: Option<Vec<f64>>,
    columns: Vec<(String, Column)>,
}

impl FeatureFrame {
    /// History table from observations, keeping row order.
    pub fn from_series(frame: &SeriesFrame) -> Self {
        Self {
            unique_id: frame.iter().map(|r| r.unique_id.clone()).collect(),
            ds: frame.iter().map(|r| r.ds).collect(),
            y: Some(frame.iter().map(|r| r.y).collect()),
            columns: Vec::new(),
        }
    }

    /// Key-only table without a target column.
    pub fn from_keys(unique_id: Vec<String>, ds: Vec<NaiveDate>) -> Result<Self> {
        if unique_id.len() != ds.len() {
            return Err(PipelineError::DimensionMismatch {
                expected: unique_id.len(),
                got: ds.len(),
            });
        }
        Ok(Self {
            unique_id,
            ds,
            y: None,
            columns: Vec::new(),
        })
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }

    pub fn unique_id(&self) -> &[String] {
        &self.unique_id
    }

    pub fn ds(&self) -> &[NaiveDate] {
        &self.ds
    }

    pub fn y(&self) -> Option<&[f64]> {
        self.y.as_deref()
    }

    pub fn has_target(&self) -> bool {
        self.y.is_some()
    }

    /// All column names in output order: keys, target (if any), features.
    pub fn column_names(&self) -> Vec<&str> {
        let mut names = vec!["unique_id", "ds"];
        if self.y.is_some() {
            names.push("y");
        }
        names.extend(self.columns.iter().map(|(name, _)| name.as_str()));
        names
    }

    /// Feature column names only.
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn columns(&self) -> &[(String, Column)] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Append a feature column.
    ///
    /// Fails with a schema error on a duplicate or reserved name, or when the
    /// column length differs from the frame height.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if RESERVED_COLUMNS.contains(&name.as_str()) || self.column(&name).is_some() {
            return Err(PipelineError::Schema(format!("duplicate column '{name}'")));
        }
        if column.len() != self.height() {
            return Err(PipelineError::Schema(format!(
                "column '{name}' has {} rows, frame has {}",
                column.len(),
                self.height()
            )));
        }
        self.columns.push((name, column));
        Ok(())
    }

    /// Builder-style [`FeatureFrame::push_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        self.push_column(name, column)?;
        Ok(self)
    }

    /// Remove a feature column by name, or the target when `name == "y"`.
    pub fn drop_column(mut self, name: &str) -> Result<Self> {
        if name == "y" {
            return match self.y.take() {
                Some(_) => Ok(self),
                None => Err(PipelineError::Schema("no column 'y' to drop".to_string())),
            };
        }
        let idx = self
            .columns
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| PipelineError::Schema(format!("no column '{name}' to drop")))?;
        self.columns.remove(idx);
        Ok(self)
    }

    /// Last date per series.
    pub fn last_dates(&self) -> BTreeMap<&str, NaiveDate> {
        let mut last: BTreeMap<&str, NaiveDate> = BTreeMap::new();
        for (id, &ds) in self.unique_id.iter().zip(&self.ds) {
            last.entry(id.as_str())
                .and_modify(|d| *d = (*d).max(ds))
                .or_insert(ds);
        }
        last
    }

    /// Earliest date in the table.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.ds.iter().min().copied()
    }

    /// Key-exact left join on `(unique_id, ds)`.
    ///
    /// Every row of `self` must match exactly one row of `right`; the output
    /// keeps `self`'s rows in order and appends `right`'s feature columns.
    /// `right` must not carry a target. Any miss, duplicate key or clashing
    /// column name is a schema error, so the result always has `self.height()`
    /// rows.
    pub fn join(mut self, right: &FeatureFrame) -> Result<Self> {
        if right.has_target() {
            return Err(PipelineError::Schema(
                "right side of join carries 'y'; drop it first".to_string(),
            ));
        }

        let mut index: HashMap<(&str, NaiveDate), usize> = HashMap::with_capacity(right.height());
        for (i, (id, &ds)) in right.unique_id.iter().zip(&right.ds).enumerate() {
            if index.insert((id.as_str(), ds), i).is_some() {
                return Err(PipelineError::Schema(format!(
                    "duplicate join key ({id}, {ds}) on right side"
                )));
            }
        }

        let mut take = Vec::with_capacity(self.height());
        for (id, &ds) in self.unique_id.iter().zip(&self.ds) {
            let i = index.get(&(id.as_str(), ds)).ok_or_else(|| {
                PipelineError::Schema(format!("join key ({id}, {ds}) missing on right side"))
            })?;
            take.push(*i);
        }

        for (name, column) in &right.columns {
            self.push_column(name.clone(), column.take(&take))?;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Observation;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn history() -> FeatureFrame {
        let frame = SeriesFrame::new(vec![
            Observation::new("Coffee", date(1), 20.0),
            Observation::new("Coffee", date(2), 22.0),
            Observation::new("Tea", date(1), 5.0),
        ]);
        FeatureFrame::from_series(&frame)
    }

    fn features(ids: &[&str], days: &[u32], values: &[f64]) -> FeatureFrame {
        FeatureFrame::from_keys(
            ids.iter().map(|s| s.to_string()).collect(),
            days.iter().map(|&d| date(d)).collect(),
        )
        .unwrap()
        .with_column("f", Column::Float(values.to_vec()))
        .unwrap()
    }

    #[test]
    fn column_names_list_keys_target_and_features() {
        let frame = history()
            .with_column("trend", Column::Float(vec![1.0, 2.0, 1.0]))
            .unwrap();
        assert_eq!(frame.column_names(), vec!["unique_id", "ds", "y", "trend"]);
        assert_eq!(frame.feature_names(), vec!["trend"]);
    }

    #[test]
    fn push_column_rejects_duplicates_and_bad_lengths() {
        let mut frame = history();
        frame
            .push_column("trend", Column::Float(vec![1.0, 2.0, 3.0]))
            .unwrap();
        assert!(matches!(
            frame.push_column("trend", Column::Float(vec![0.0; 3])),
            Err(PipelineError::Schema(_))
        ));
        assert!(matches!(
            frame.push_column("y", Column::Float(vec![0.0; 3])),
            Err(PipelineError::Schema(_))
        ));
        assert!(matches!(
            frame.push_column("short", Column::Int(vec![1])),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn drop_column_removes_target_or_feature() {
        let frame = history()
            .with_column("trend", Column::Float(vec![1.0, 2.0, 1.0]))
            .unwrap();
        let no_y = frame.clone().drop_column("y").unwrap();
        assert!(!no_y.has_target());
        let no_trend = frame.drop_column("trend").unwrap();
        assert_eq!(no_trend.feature_names(), Vec::<&str>::new());
        assert!(no_trend.drop_column("trend").is_err());
    }

    #[test]
    fn join_aligns_on_series_and_date() {
        let right = features(&["Tea", "Coffee", "Coffee"], &[1, 2, 1], &[0.5, 2.2, 2.0]);
        let joined = history().join(&right).unwrap();
        assert_eq!(joined.height(), 3);
        assert_eq!(
            joined.column("f").unwrap().as_float().unwrap(),
            &[2.0, 2.2, 0.5]
        );
        assert_eq!(joined.y().unwrap(), &[20.0, 22.0, 5.0]);
    }

    #[test]
    fn join_fails_on_missing_key() {
        let right = features(&["Coffee", "Coffee"], &[1, 2], &[2.0, 2.2]);
        let err = history().join(&right).unwrap_err();
        assert!(err.to_string().contains("missing on right side"));
    }

    #[test]
    fn join_fails_on_duplicate_right_key() {
        let right = features(&["Coffee", "Coffee", "Tea"], &[1, 1, 1], &[1.0, 1.0, 1.0]);
        assert!(matches!(
            history().join(&right),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn join_rejects_right_target() {
        assert!(matches!(
            history().join(&history()),
            Err(PipelineError::Schema(_))
        ));
    }

    #[test]
    fn last_dates_per_series() {
        let frame = history();
        let last = frame.last_dates();
        assert_eq!(last["Coffee"], date(2));
        assert_eq!(last["Tea"], date(1));
        assert_eq!(frame.first_date(), Some(date(1)));
    }
}
