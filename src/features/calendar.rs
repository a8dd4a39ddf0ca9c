//! Holiday calendar and holiday features.
//!
//! The calendar holds a set of named holiday dates plus a precomputed entry
//! for every day in a fixed range. Dates outside the range still get day
//! counts computed from the full holiday set, but are never flagged as a
//! holiday themselves.

use crate::core::{Column, FeatureFrame};
use crate::error::{PipelineError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::{Bound, RangeInclusive};

/// Distance reported when no holiday exists in that direction.
pub const NO_HOLIDAY_DISTANCE: i64 = 365;

/// Columns added by [`HolidayCalendar::annotate`], in order.
pub const HOLIDAY_COLUMNS: [&str; 5] = [
    "is_holiday",
    "holiday_name",
    "days_to_holiday",
    "days_since_holiday",
    "num_holidays",
];

/// A named holiday date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: String,
}

impl Holiday {
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

/// Holiday features for one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayEntry {
    pub ds: NaiveDate,
    pub is_holiday: bool,
    /// Holiday name, empty when not a holiday.
    pub holiday_name: String,
    /// Days until the next holiday strictly after `ds`.
    pub days_to_holiday: i64,
    /// Days since the last holiday strictly before `ds`.
    pub days_since_holiday: i64,
}

/// Holiday dates plus a per-day entry table over a fixed range.
#[derive(Debug, Clone)]
pub struct HolidayCalendar {
    holidays: BTreeMap<NaiveDate, String>,
    entries: BTreeMap<NaiveDate, HolidayEntry>,
}

impl HolidayCalendar {
    /// Build a calendar from explicit holidays with entries for `start..=end`.
    ///
    /// Several holidays on the same date are merged into one name joined by `"; "`.
    pub fn new<I>(holidays: I, start: NaiveDate, end: NaiveDate) -> Result<Self>
    where
        I: IntoIterator<Item = Holiday>,
    {
        if start > end {
            return Err(PipelineError::Config(format!(
                "holiday calendar start ({start}) is after end ({end})"
            )));
        }

        let mut merged: BTreeMap<NaiveDate, String> = BTreeMap::new();
        for h in holidays {
            merged
                .entry(h.date)
                .and_modify(|name| {
                    if !name.split("; ").any(|n| n == h.name) {
                        name.push_str("; ");
                        name.push_str(&h.name);
                    }
                })
                .or_insert(h.name);
        }

        let mut calendar = Self {
            holidays: merged,
            entries: BTreeMap::new(),
        };
        calendar.entries = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| (d, calendar.compute_entry(d)))
            .collect();
        Ok(calendar)
    }

    /// US federal holidays for `years` plus `extra` holidays, entries for `start..=end`.
    pub fn us_federal(
        years: RangeInclusive<i32>,
        extra: &[Holiday],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        let holidays = years
            .flat_map(us_federal_holidays)
            .chain(extra.iter().cloned());
        Self::new(holidays, start, end)
    }

    /// Holiday dates and names in date order.
    pub fn holidays(&self) -> impl Iterator<Item = (NaiveDate, &str)> {
        self.holidays.iter().map(|(d, n)| (*d, n.as_str()))
    }

    /// Precomputed entries in date order.
    pub fn entries(&self) -> impl Iterator<Item = &HolidayEntry> {
        self.entries.values()
    }

    pub fn is_holiday(&self, ds: NaiveDate) -> bool {
        self.holidays.contains_key(&ds)
    }

    /// Minimum strictly positive distance to a later holiday.
    pub fn days_to_next(&self, ds: NaiveDate) -> i64 {
        self.holidays
            .range((Bound::Excluded(ds), Bound::Unbounded))
            .next()
            .map(|(h, _)| (*h - ds).num_days())
            .unwrap_or(NO_HOLIDAY_DISTANCE)
            .min(NO_HOLIDAY_DISTANCE)
    }

    /// Minimum strictly positive distance to an earlier holiday.
    pub fn days_since_last(&self, ds: NaiveDate) -> i64 {
        self.holidays
            .range(..ds)
            .next_back()
            .map(|(h, _)| (ds - *h).num_days())
            .unwrap_or(NO_HOLIDAY_DISTANCE)
            .min(NO_HOLIDAY_DISTANCE)
    }

    /// Entry for `ds`: the table row if in range, otherwise a non-holiday
    /// entry whose day counts still use the full holiday set.
    pub fn entry(&self, ds: NaiveDate) -> HolidayEntry {
        self.entries.get(&ds).cloned().unwrap_or_else(|| HolidayEntry {
            ds,
            is_holiday: false,
            holiday_name: String::new(),
            days_to_holiday: self.days_to_next(ds),
            days_since_holiday: self.days_since_last(ds),
        })
    }

    fn compute_entry(&self, ds: NaiveDate) -> HolidayEntry {
        let name = self.holidays.get(&ds);
        HolidayEntry {
            ds,
            is_holiday: name.is_some(),
            holiday_name: name.cloned().unwrap_or_default(),
            days_to_holiday: self.days_to_next(ds),
            days_since_holiday: self.days_since_last(ds),
        }
    }

    /// Left-join holiday features onto `frame` by date.
    pub fn annotate(&self, mut frame: FeatureFrame) -> Result<FeatureFrame> {
        let entries: Vec<HolidayEntry> = frame.ds().iter().map(|&d| self.entry(d)).collect();
        frame.push_column(
            HOLIDAY_COLUMNS[0],
            Column::Bool(entries.iter().map(|e| e.is_holiday).collect()),
        )?;
        frame.push_column(
            HOLIDAY_COLUMNS[1],
            Column::Text(entries.iter().map(|e| e.holiday_name.clone()).collect()),
        )?;
        frame.push_column(
            HOLIDAY_COLUMNS[2],
            Column::Int(entries.iter().map(|e| e.days_to_holiday).collect()),
        )?;
        frame.push_column(
            HOLIDAY_COLUMNS[3],
            Column::Int(entries.iter().map(|e| e.days_since_holiday).collect()),
        )?;
        frame.push_column(
            HOLIDAY_COLUMNS[4],
            Column::Int(entries.iter().map(|e| i64::from(e.is_holiday)).collect()),
        )?;
        Ok(frame)
    }
}

/// US federal holidays of one year, with weekend observance.
///
/// A holiday on a Saturday is observed the Friday before, one on a Sunday
/// the Monday after; observed days carry the suffix `" (observed)"`.
pub fn us_federal_holidays(year: i32) -> Vec<Holiday> {
    let mut out = Vec::new();
    let mut fixed = |month: u32, day: u32, name: &str| {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            out.push(Holiday::new(date, name));
            if let Some(observed) = observed_date(date) {
                out.push(Holiday::new(observed, format!("{name} (observed)")));
            }
        }
    };
    fixed(1, 1, "New Year's Day");
    if year >= 2021 {
        fixed(6, 19, "Juneteenth National Independence Day");
    }
    fixed(7, 4, "Independence Day");
    fixed(11, 11, "Veterans Day");
    fixed(12, 25, "Christmas Day");

    let floating = [
        (1, Weekday::Mon, 3, "Martin Luther King Jr. Day"),
        (2, Weekday::Mon, 3, "Washington's Birthday"),
        (9, Weekday::Mon, 1, "Labor Day"),
        (10, Weekday::Mon, 2, "Columbus Day"),
        (11, Weekday::Thu, 4, "Thanksgiving"),
    ];
    for (month, weekday, n, name) in floating {
        if let Some(date) = NaiveDate::from_weekday_of_month_opt(year, month, weekday, n) {
            out.push(Holiday::new(date, name));
        }
    }
    if let Some(date) = last_weekday_of_month(year, 5, Weekday::Mon) {
        out.push(Holiday::new(date, "Memorial Day"));
    }

    out.sort_by_key(|h| h.date);
    out
}

fn observed_date(date: NaiveDate) -> Option<NaiveDate> {
    match date.weekday() {
        Weekday::Sat => Some(date - Duration::days(1)),
        Weekday::Sun => Some(date + Duration::days(1)),
        _ => None,
    }
}

fn last_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> Option<NaiveDate> {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, 5)
        .or_else(|| NaiveDate::from_weekday_of_month_opt(year, month, weekday, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn names_on(year: i32, d: NaiveDate) -> Vec<String> {
        us_federal_holidays(year)
            .into_iter()
            .filter(|h| h.date == d)
            .map(|h| h.name)
            .collect()
    }

    #[test]
    fn floating_holidays_land_on_expected_days() {
        assert_eq!(names_on(2024, date(2024, 1, 15)), vec!["Martin Luther King Jr. Day"]);
        assert_eq!(names_on(2024, date(2024, 5, 27)), vec!["Memorial Day"]);
        assert_eq!(names_on(2024, date(2024, 9, 2)), vec!["Labor Day"]);
        assert_eq!(names_on(2024, date(2024, 11, 28)), vec!["Thanksgiving"]);
        assert_eq!(names_on(2025, date(2025, 11, 27)), vec!["Thanksgiving"]);
    }

    #[test]
    fn weekend_holidays_are_observed() {
        // 2021-12-25 is a Saturday, 2022-12-25 a Sunday
        assert_eq!(names_on(2021, date(2021, 12, 24)), vec!["Christmas Day (observed)"]);
        assert_eq!(names_on(2022, date(2022, 12, 26)), vec!["Christmas Day (observed)"]);
        // 2024-07-04 is a Thursday
        assert!(names_on(2024, date(2024, 7, 5)).is_empty());
    }

    #[test]
    fn juneteenth_starts_in_2021() {
        assert!(names_on(2020, date(2020, 6, 19)).is_empty());
        assert_eq!(
            names_on(2023, date(2023, 6, 19)),
            vec!["Juneteenth National Independence Day"]
        );
    }

    #[test]
    fn day_counts_use_nearest_strictly_later_and_earlier_holiday() {
        let cal = HolidayCalendar::new(
            vec![
                Holiday::new(date(2024, 1, 1), "A"),
                Holiday::new(date(2024, 1, 10), "B"),
            ],
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .unwrap();

        let e = cal.entry(date(2024, 1, 4));
        assert!(!e.is_holiday);
        assert_eq!(e.days_to_holiday, 6);
        assert_eq!(e.days_since_holiday, 3);

        // on a holiday, the holiday itself is not counted in either direction
        let e = cal.entry(date(2024, 1, 10));
        assert!(e.is_holiday);
        assert_eq!(e.holiday_name, "B");
        assert_eq!(e.days_to_holiday, NO_HOLIDAY_DISTANCE);
        assert_eq!(e.days_since_holiday, 9);

        let e = cal.entry(date(2024, 1, 1));
        assert_eq!(e.days_since_holiday, NO_HOLIDAY_DISTANCE);
        assert_eq!(e.days_to_holiday, 9);
    }

    #[test]
    fn dates_outside_range_are_not_holidays_but_keep_counts() {
        let cal = HolidayCalendar::new(
            vec![
                Holiday::new(date(2024, 1, 1), "A"),
                Holiday::new(date(2024, 3, 1), "B"),
            ],
            date(2024, 1, 1),
            date(2024, 1, 31),
        )
        .unwrap();

        let e = cal.entry(date(2024, 3, 1));
        assert!(!e.is_holiday);
        assert_eq!(e.holiday_name, "");
        assert_eq!(e.days_since_holiday, 60);
        assert_eq!(e.days_to_holiday, NO_HOLIDAY_DISTANCE);

        let e = cal.entry(date(2024, 2, 20));
        assert_eq!(e.days_to_holiday, 10);
    }

    #[test]
    fn distances_are_capped() {
        let cal = HolidayCalendar::new(
            vec![Holiday::new(date(2020, 1, 1), "A")],
            date(2020, 1, 1),
            date(2020, 1, 2),
        )
        .unwrap();
        assert_eq!(cal.days_since_last(date(2022, 1, 1)), NO_HOLIDAY_DISTANCE);
    }

    #[test]
    fn same_day_holidays_are_merged() {
        let cal = HolidayCalendar::new(
            vec![
                Holiday::new(date(2024, 2, 14), "Valentine's Day"),
                Holiday::new(date(2024, 2, 14), "Launch"),
                Holiday::new(date(2024, 2, 14), "Launch"),
            ],
            date(2024, 2, 1),
            date(2024, 2, 28),
        )
        .unwrap();
        assert_eq!(cal.entry(date(2024, 2, 14)).holiday_name, "Valentine's Day; Launch");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = HolidayCalendar::new(vec![], date(2024, 2, 1), date(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn entries_cover_the_range() {
        let cal = HolidayCalendar::us_federal(2020..=2026, &[], date(2020, 7, 1), date(2026, 1, 31))
            .unwrap();
        assert_eq!(cal.entries().count(), 2041);
        assert!(cal.is_holiday(date(2025, 1, 1)));
        assert!(cal.entry(date(2024, 12, 25)).is_holiday);
    }

    #[test]
    fn annotate_adds_holiday_columns() {
        let cal = HolidayCalendar::us_federal(2024..=2024, &[], date(2024, 1, 1), date(2024, 12, 31))
            .unwrap();
        let frame = FeatureFrame::from_keys(
            vec!["Tea".into(), "Tea".into()],
            vec![date(2024, 12, 24), date(2024, 12, 25)],
        )
        .unwrap();
        let out = cal.annotate(frame).unwrap();
        assert_eq!(out.feature_names(), HOLIDAY_COLUMNS.to_vec());
        assert_eq!(out.column("is_holiday").unwrap().as_bool().unwrap(), &[false, true]);
        assert_eq!(out.column("num_holidays").unwrap().as_int().unwrap(), &[0, 1]);
        assert_eq!(
            out.column("holiday_name").unwrap().as_text().unwrap(),
            &["".to_string(), "Christmas Day".to_string()]
        );
        assert_eq!(out.column("days_to_holiday").unwrap().as_int().unwrap(), &[1, 365]);
    }
}
