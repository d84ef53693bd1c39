//! Home-page summary: this month's KPIs and chart series

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::aggregate::{by_category, top_by, total_amount, Bucket, BucketMap};
use crate::error::{Error, Result};
use crate::models::{TransactionRecord, UNCATEGORIZED};
use crate::window::{
    bucket_by_month, bucket_by_week, month_start_offset, select_since, select_window, MonthKey,
};

/// Upper bounds accepted for the window sizes
pub const MAX_DAILY_DAYS: i64 = 366;
pub const MAX_WEEKLY_WEEKS: usize = 520;
pub const MAX_CATEGORY_MONTHS: u32 = 120;

/// Color used for categories without one
pub const DEFAULT_CATEGORY_COLOR: &str = "#6c757d";

/// Window sizes for the dashboard series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Most recent months with spend in the monthly series
    pub monthly_months: usize,
    pub weekly_weeks: usize,
    /// Category breakdown covers this many whole months before the current one
    pub category_months: u32,
    pub category_limit: usize,
    pub daily_days: i64,
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            monthly_months: 6,
            weekly_weeks: 4,
            category_months: 3,
            category_limit: 8,
            daily_days: 7,
            recent_limit: 10,
        }
    }
}

impl DashboardConfig {
    /// Reject window sizes outside the ranges the series can cover
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_DAILY_DAYS).contains(&self.daily_days) {
            return Err(Error::Config(format!(
                "dashboard.daily_days must be between 1 and {}",
                MAX_DAILY_DAYS
            )));
        }
        if !(1..=MAX_WEEKLY_WEEKS).contains(&self.weekly_weeks) {
            return Err(Error::Config(format!(
                "dashboard.weekly_weeks must be between 1 and {}",
                MAX_WEEKLY_WEEKS
            )));
        }
        if self.category_months > MAX_CATEGORY_MONTHS {
            return Err(Error::Config(format!(
                "dashboard.category_months must be at most {}",
                MAX_CATEGORY_MONTHS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthStats {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub top_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: MonthKey,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyPoint {
    /// Sunday the week starts on
    pub week: NaiveDate,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    pub name: String,
    pub amount: f64,
    pub color: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub day: NaiveDate,
    pub amount: f64,
    pub count: usize,
}

/// A row in the recent-transactions list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentTransaction {
    pub id: String,
    pub date: Option<NaiveDate>,
    pub description: String,
    pub amount: f64,
    pub category: String,
    pub color: String,
    /// Installment progress, e.g. "3/12 - 9 left"
    pub installment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub month: MonthKey,
    pub this_month: MonthStats,
    pub monthly: Vec<MonthlyPoint>,
    pub weekly: Vec<WeeklyPoint>,
    pub categories: Vec<CategorySlice>,
    pub daily: Vec<DayPoint>,
    pub recent: Vec<RecentTransaction>,
}

impl DashboardSummary {
    pub fn build(
        records: &[TransactionRecord],
        now: NaiveDateTime,
        config: &DashboardConfig,
    ) -> Self {
        let month = MonthKey::of(now.date());
        Self {
            month,
            this_month: this_month(records, month),
            monthly: monthly_series(records, config.monthly_months),
            weekly: weekly_series(records, now, config.weekly_weeks),
            categories: category_breakdown(records, now, config),
            daily: daily_series(records, now, config.daily_days),
            recent: recent_transactions(records, config.recent_limit),
        }
    }
}

fn this_month(records: &[TransactionRecord], month: MonthKey) -> MonthStats {
    let current: Vec<&TransactionRecord> = records
        .iter()
        .filter(|r| r.date().is_some_and(|d| MonthKey::of(d) == month))
        .collect();

    let total = total_amount(&current);
    let count = current.len();
    let categories = by_category(&current);
    let top_category = top_by(&categories, |b| b.total)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    MonthStats {
        total,
        count,
        average: Bucket { total, count }.average(),
        top_category,
    }
}

/// Totals for the most recent `months` months that have spend
pub fn monthly_series(records: &[TransactionRecord], months: usize) -> Vec<MonthlyPoint> {
    let buckets = bucket_by_month(records);
    let skip = buckets.len().saturating_sub(months);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(month, records)| MonthlyPoint {
            month,
            amount: total_amount(&records),
        })
        .collect()
}

/// Sunday-start weeks within the last `weeks * 7` days
pub fn weekly_series(
    records: &[TransactionRecord],
    now: NaiveDateTime,
    weeks: usize,
) -> Vec<WeeklyPoint> {
    let weeks = weeks.min(MAX_WEEKLY_WEEKS);
    let recent = select_window(records, now, weeks as i64 * 7);
    let buckets = bucket_by_week(recent.iter().copied());
    let skip = buckets.len().saturating_sub(weeks);
    buckets
        .into_iter()
        .skip(skip)
        .map(|(week, records)| WeeklyPoint {
            week,
            amount: total_amount(&records),
            count: records.len(),
        })
        .collect()
}

/// Category totals since the start of the month `category_months` back,
/// largest first
pub fn category_breakdown(
    records: &[TransactionRecord],
    now: NaiveDateTime,
    config: &DashboardConfig,
) -> Vec<CategorySlice> {
    let start = month_start_offset(now, config.category_months.min(MAX_CATEGORY_MONTHS));
    let selected = select_since(records, start, now);

    let mut totals: BucketMap<String> = BucketMap::new();
    // parallel to `totals`, color of the first record seen per category
    let mut colors: Vec<String> = Vec::new();
    for record in &selected {
        if !totals.contains(&record.category_name) {
            colors.push(
                record
                    .category_color
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            );
        }
        totals.add(record.category_name.clone(), record.amount);
    }

    let mut slices: Vec<CategorySlice> = totals
        .into_vec()
        .into_iter()
        .zip(colors)
        .map(|((name, bucket), color)| CategorySlice {
            name,
            amount: bucket.total,
            color,
            count: bucket.count,
        })
        .collect();

    // stable: equal amounts keep first-seen order
    slices.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    slices.truncate(config.category_limit);
    slices
}

/// The last `days` calendar days ending today, zero-filled
pub fn daily_series(
    records: &[TransactionRecord],
    now: NaiveDateTime,
    days: i64,
) -> Vec<DayPoint> {
    let days = days.clamp(0, MAX_DAILY_DAYS);
    let today = now.date();
    let first = today - Duration::days(days - 1);
    let mut points: Vec<DayPoint> = (0..days)
        .map(|offset| DayPoint {
            day: first + Duration::days(offset),
            amount: 0.0,
            count: 0,
        })
        .collect();

    for record in select_window(records, now, days) {
        let Some(date) = record.date() else { continue };
        if date < first {
            continue;
        }
        if let Some(point) = points.get_mut((date - first).num_days() as usize) {
            point.amount += record.amount;
            point.count += 1;
        }
    }
    points
}

/// Newest records first; undated records sort last
pub fn recent_transactions(
    records: &[TransactionRecord],
    limit: usize,
) -> Vec<RecentTransaction> {
    let mut sorted: Vec<&TransactionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
        .into_iter()
        .take(limit)
        .map(|r| RecentTransaction {
            id: r.id.clone(),
            date: r.date(),
            description: r.description.clone(),
            amount: r.amount,
            category: r.category_name.clone(),
            color: r
                .category_color
                .clone()
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            installment: r.installment_progress().map(|p| p.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> NaiveDateTime {
        // Wednesday
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn on(y: i32, m: u32, d: u32, amount: f64, category: &str) -> TransactionRecord {
        let ts = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        TransactionRecord::new(format!("{y}-{m}-{d}-{amount}"), ts, amount)
            .with_category(category)
    }

    #[test]
    fn test_this_month_kpis() {
        let records = vec![
            on(2024, 5, 1, 100.0, "Food"),
            on(2024, 5, 10, 300.0, "Fuel"),
            on(2024, 5, 12, 50.0, "Food"),
            on(2024, 4, 30, 999.0, "Fuel"),
        ];
        let stats = this_month(&records, MonthKey::of(now().date()));
        assert_eq!(stats.total, 450.0);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average, 150.0);
        assert_eq!(stats.top_category, "Fuel");
    }

    #[test]
    fn test_monthly_series_keeps_latest_months() {
        let records: Vec<_> = (1..=8).map(|m| on(2023, m, 5, m as f64, "x")).collect();
        let series = monthly_series(&records, 6);
        assert_eq!(series.len(), 6);
        assert_eq!(series[0].month.to_string(), "2023-03");
        assert_eq!(series[5].month.to_string(), "2023-08");
        assert_eq!(series[5].amount, 8.0);
    }

    #[test]
    fn test_weekly_series() {
        let records = vec![
            on(2024, 5, 12, 10.0, "x"), // Sunday
            on(2024, 5, 14, 20.0, "x"), // Tuesday, same week
            on(2024, 5, 9, 5.0, "x"),
            on(2024, 4, 1, 500.0, "x"), // outside 28 days
        ];
        let weekly = weekly_series(&records, now(), 4);
        assert_eq!(weekly.len(), 2);
        assert_eq!(weekly[1].week, NaiveDate::from_ymd_opt(2024, 5, 12).unwrap());
        assert_eq!(weekly[1].amount, 30.0);
        assert_eq!(weekly[1].count, 2);
        assert_eq!(weekly[0].week, NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
    }

    #[test]
    fn test_category_breakdown_sorted_and_limited() {
        let mut records = vec![
            on(2024, 2, 1, 40.0, "Food"),
            on(2024, 3, 1, 40.0, "Fuel"),
            on(2024, 1, 31, 900.0, "Old"),
        ];
        records[0].category_color = Some("#ff0000".to_string());
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g"].iter().enumerate() {
            records.push(on(2024, 4, 1, 10.0 + i as f64, name));
        }

        let slices = category_breakdown(&records, now(), &DashboardConfig::default());
        assert_eq!(slices.len(), 8);
        // ties keep first-seen order
        assert_eq!(slices[0].name, "Food");
        assert_eq!(slices[0].color, "#ff0000");
        assert_eq!(slices[1].name, "Fuel");
        assert_eq!(slices[1].color, DEFAULT_CATEGORY_COLOR);
        assert!(slices.iter().all(|s| s.name != "Old"));
        assert!(slices.iter().all(|s| s.name != "a"));
    }

    #[test]
    fn test_daily_series_zero_filled() {
        let records = vec![on(2024, 5, 15, 25.0, "x"), on(2024, 5, 9, 3.0, "x")];
        let daily = daily_series(&records, now(), 7);
        assert_eq!(daily.len(), 7);
        assert_eq!(daily[0].day, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        assert_eq!(daily[0].amount, 3.0);
        assert_eq!(daily[6].amount, 25.0);
        assert_eq!(daily[3].count, 0);
    }

    #[test]
    fn test_oversized_windows_are_capped() {
        let config = DashboardConfig {
            daily_days: 1_000_000_000,
            weekly_weeks: usize::MAX,
            category_months: u32::MAX,
            ..DashboardConfig::default()
        };
        assert!(config.validate().is_err());

        let records = vec![on(2024, 5, 15, 25.0, "x")];
        let summary = DashboardSummary::build(&records, now(), &config);
        assert_eq!(summary.daily.len(), MAX_DAILY_DAYS as usize);
        assert_eq!(summary.daily.last().unwrap().amount, 25.0);
        assert_eq!(summary.weekly.len(), 1);
        assert_eq!(summary.categories.len(), 1);
    }

    #[test]
    fn test_default_config_is_valid() {
        DashboardConfig::default().validate().unwrap();
    }

    #[test]
    fn test_recent_transactions_with_installments() {
        let mut undated = on(2024, 5, 1, 1.0, "x");
        undated.timestamp = None;
        let records = vec![
            undated,
            on(2024, 5, 2, 2.0, "x").with_memo("תשלום 3 מתוך 12"),
            on(2024, 5, 3, 3.0, "x"),
        ];
        let recent = recent_transactions(&records, 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].amount, 3.0);
        assert_eq!(recent[1].installment.as_deref(), Some("3/12 - 9 left"));
    }
}
