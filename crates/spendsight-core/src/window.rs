//! Time windows and calendar buckets
//!
//! Two partitioning axes are used side by side:
//! - rolling windows (`now - days*24h`), for "last 7/30/60 days" comparisons
//! - calendar buckets (month, Sunday-start week, weekday), for trends and charts
//!
//! Every window is half-open `[start, end)`. Records without a timestamp are
//! never selected and never bucketed.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Serialize, Serializer};

use crate::models::TransactionRecord;

/// Weekdays in display order, Sunday first
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

/// Records with `now - days_back days <= ts < now`
pub fn select_window<'a, I>(
    records: I,
    now: NaiveDateTime,
    days_back: i64,
) -> Vec<&'a TransactionRecord>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let start = Duration::try_days(days_back)
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(NaiveDateTime::MIN);
    select_between(records, start, now)
}

/// Records with `start <= ts < end`
pub fn select_between<'a, I>(
    records: I,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<&'a TransactionRecord>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    records
        .into_iter()
        .filter(|r| r.timestamp.is_some_and(|ts| ts >= start && ts < end))
        .collect()
}

/// Records with `start <= ts < now`
pub fn select_since<'a, I>(
    records: I,
    start: NaiveDateTime,
    now: NaiveDateTime,
) -> Vec<&'a TransactionRecord>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    select_between(records, start, now)
}

/// Calendar month key, rendered as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The month `months` before this one
    pub fn minus(self, months: u32) -> Self {
        let index = self.year as i64 * 12 + self.month as i64 - 1 - months as i64;
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn first_day(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The most recent Sunday at or before `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Group dated records by calendar month
pub fn bucket_by_month<'a, I>(records: I) -> BTreeMap<MonthKey, Vec<&'a TransactionRecord>>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut buckets: BTreeMap<MonthKey, Vec<&'a TransactionRecord>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            buckets.entry(MonthKey::of(date)).or_default().push(record);
        }
    }
    buckets
}

/// Group dated records by Sunday-start week
pub fn bucket_by_week<'a, I>(records: I) -> BTreeMap<NaiveDate, Vec<&'a TransactionRecord>>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<&'a TransactionRecord>> = BTreeMap::new();
    for record in records {
        if let Some(date) = record.date() {
            buckets.entry(week_start(date)).or_default().push(record);
        }
    }
    buckets
}

/// Group dated records by weekday; all seven days present, Sunday first
pub fn bucket_by_weekday<'a, I>(records: I) -> Vec<(Weekday, Vec<&'a TransactionRecord>)>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut buckets: Vec<(Weekday, Vec<&'a TransactionRecord>)> =
        WEEKDAYS.iter().map(|&d| (d, Vec::new())).collect();
    for record in records {
        if let Some(date) = record.date() {
            let slot = date.weekday().num_days_from_sunday() as usize;
            buckets[slot].1.push(record);
        }
    }
    buckets
}

/// Midnight on the first day of the month `months_back` months before `now`'s
pub fn month_start_offset(now: NaiveDateTime, months_back: u32) -> NaiveDateTime {
    MonthKey::of(now.date())
        .minus(months_back)
        .first_day()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or(now)
}

/// Midnight at the start of `now`'s day
pub fn day_start(now: NaiveDateTime) -> NaiveDateTime {
    now.date().and_hms_opt(0, 0, 0).unwrap_or(now)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}

/// Friday and Saturday
pub fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Fri | Weekday::Sat)
}
