//! Long-format observation table: one row per (series, date, value).

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A single observed value of one series on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Series identifier (e.g. drink name).
    pub unique_id: String,
    /// Calendar date of the observation.
    pub ds: NaiveDate,
    /// Observed value (view counts).
    pub y: f64,
}

impl Observation {
    pub fn new(unique_id: impl Into<String>, ds: NaiveDate, y: f64) -> Self {
        Self {
            unique_id: unique_id.into(),
            ds,
            y,
        }
    }
}

/// Row count, series count and date range of a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub rows: usize,
    pub series: usize,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

/// Long table of observations.
///
/// Rows keep insertion order until [`SeriesFrame::sort_by_key`] is called;
/// processing stages leave the frame ordered by `(unique_id, ds)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesFrame {
    rows: Vec<Observation>,
}

impl SeriesFrame {
    pub fn new(rows: Vec<Observation>) -> Self {
        Self { rows }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Observation] {
        &mut self.rows
    }

    pub fn into_rows(self) -> Vec<Observation> {
        self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.rows.iter()
    }

    /// Stable sort by `(unique_id, ds)`.
    pub fn sort_by_key(&mut self) {
        self.rows
            .sort_by(|a, b| a.unique_id.cmp(&b.unique_id).then(a.ds.cmp(&b.ds)));
    }

    /// Consume and return the frame sorted by `(unique_id, ds)`.
    pub fn sorted(mut self) -> Self {
        self.sort_by_key();
        self
    }

    /// Distinct series identifiers in lexical order.
    pub fn series_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|r| r.unique_id.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Number of distinct series.
    pub fn n_series(&self) -> usize {
        self.rows
            .iter()
            .map(|r| r.unique_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Earliest and latest date, or `None` for an empty frame.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.rows.iter().map(|r| r.ds).min()?;
        let max = self.rows.iter().map(|r| r.ds).max()?;
        Some((min, max))
    }

    pub fn summary(&self) -> FrameSummary {
        let range = self.date_range();
        FrameSummary {
            rows: self.len(),
            series: self.n_series(),
            min_date: range.map(|(min, _)| min),
            max_date: range.map(|(_, max)| max),
        }
    }

    /// Keep rows matching the predicate, preserving relative order.
    pub fn filter<P>(&self, mut predicate: P) -> Self
    where
        P: FnMut(&Observation) -> bool,
    {
        Self::new(self.rows.iter().filter(|r| predicate(r)).cloned().collect())
    }

    /// Split into (matching, non-matching) rows, preserving relative order.
    pub fn partition<P>(self, mut predicate: P) -> (Self, Self)
    where
        P: FnMut(&Observation) -> bool,
    {
        let (matching, rest): (Vec<_>, Vec<_>) =
            self.rows.into_iter().partition(|r| predicate(r));
        (Self::new(matching), Self::new(rest))
    }

    /// Append the rows of `other` after the rows of `self`.
    pub fn concat(mut self, other: SeriesFrame) -> Self {
        self.rows.extend(other.rows);
        self
    }

    /// Keep only rows with `ds <= end` (inclusive ceiling).
    pub fn with_date_ceiling(self, end: NaiveDate) -> Self {
        Self::new(self.rows.into_iter().filter(|r| r.ds <= end).collect())
    }

    /// Values of one series in row order.
    pub fn values_for(&self, unique_id: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.unique_id == unique_id)
            .map(|r| r.y)
            .collect()
    }

    /// Row indices grouped by series identifier.
    pub fn group_indices(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, row) in self.rows.iter().enumerate() {
            groups.entry(row.unique_id.as_str()).or_default().push(i);
        }
        groups
    }

    /// `(unique_id, ds)` pairs that occur more than once.
    pub fn duplicate_keys(&self) -> Vec<(String, NaiveDate)> {
        let mut seen = HashSet::new();
        let mut dupes = BTreeSet::new();
        for row in &self.rows {
            if !seen.insert((row.unique_id.as_str(), row.ds)) {
                dupes.insert((row.unique_id.clone(), row.ds));
            }
        }
        dupes.into_iter().collect()
    }
}

impl FromIterator<Observation> for SeriesFrame {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> SeriesFrame {
        SeriesFrame::new(vec![
            Observation::new("Tea", date(2024, 1, 2), 4.0),
            Observation::new("Coffee", date(2024, 1, 2), 21.0),
            Observation::new("Tea", date(2024, 1, 1), 3.0),
            Observation::new("Coffee", date(2024, 1, 1), 20.0),
        ])
    }

    #[test]
    fn sort_orders_by_series_then_date() {
        let frame = sample().sorted();
        let keys: Vec<_> = frame
            .iter()
            .map(|r| (r.unique_id.as_str(), r.ds.to_string()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Coffee", "2024-01-01".to_string()),
                ("Coffee", "2024-01-02".to_string()),
                ("Tea", "2024-01-01".to_string()),
                ("Tea", "2024-01-02".to_string()),
            ]
        );
    }

    #[test]
    fn summary_reports_counts_and_range() {
        let summary = sample().summary();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.series, 2);
        assert_eq!(summary.min_date, Some(date(2024, 1, 1)));
        assert_eq!(summary.max_date, Some(date(2024, 1, 2)));
    }

    #[test]
    fn empty_frame_has_no_range() {
        let summary = SeriesFrame::empty().summary();
        assert_eq!(summary.rows, 0);
        assert_eq!(summary.series, 0);
        assert!(summary.min_date.is_none());
    }

    #[test]
    fn filter_preserves_relative_order() {
        let frame = sample().filter(|r| r.unique_id == "Tea");
        let values: Vec<_> = frame.iter().map(|r| r.y).collect();
        assert_eq!(values, vec![4.0, 3.0]);
    }

    #[test]
    fn partition_and_concat_keep_every_row() {
        let (tea, rest) = sample().partition(|r| r.unique_id == "Tea");
        assert_eq!(tea.len(), 2);
        assert_eq!(rest.len(), 2);
        assert_eq!(rest.concat(tea).len(), 4);
    }

    #[test]
    fn date_ceiling_is_inclusive() {
        let frame = sample().with_date_ceiling(date(2024, 1, 1));
        assert_eq!(frame.len(), 2);
        assert!(frame.iter().all(|r| r.ds == date(2024, 1, 1)));
    }

    #[test]
    fn duplicate_keys_are_detected() {
        let mut rows = sample().into_rows();
        rows.push(Observation::new("Tea", date(2024, 1, 1), 9.0));
        let frame = SeriesFrame::new(rows);
        assert_eq!(
            frame.duplicate_keys(),
            vec![("Tea".to_string(), date(2024, 1, 1))]
        );
        assert!(sample().duplicate_keys().is_empty());
    }

    #[test]
    fn group_indices_cover_all_rows() {
        let frame = sample();
        let groups = frame.group_indices();
        assert_eq!(groups["Tea"], vec![0, 2]);
        assert_eq!(groups["Coffee"], vec![1, 3]);
    }
}
