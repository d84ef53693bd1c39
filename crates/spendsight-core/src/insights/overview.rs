//! Headline numbers, categorization stats and the daily chart series

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::aggregate::{
    by_category, round_half_up, safe_percent, top_by, total_amount, BucketMap,
};
use crate::models::{TransactionRecord, UNCATEGORIZED};
use crate::trend::{compute_trend_with, Trend, TrendPolicy};
use crate::window::{
    bucket_by_weekday, day_start, select_between, select_window, weekday_name, WEEKDAYS,
};

/// Days in the rolling "month" used by the headline numbers
const MONTH_DAYS: i64 = 30;
const SERIES_DAYS: i64 = 30;

/// Headline numbers over the last 30 days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreInsights {
    pub daily_average: i64,
    /// Daily average vs the 30 days before; `None` when there is no data at all
    pub daily_trend: Option<Trend>,
    pub expensive_day: String,
    /// Average purchase on the expensive day
    pub expensive_day_amount: i64,
    pub top_category: String,
    pub top_category_percent: i64,
    /// Purchases per day, one decimal
    pub transaction_frequency: f64,
}

impl CoreInsights {
    /// Defaults for an empty snapshot
    pub fn empty() -> Self {
        Self {
            daily_average: 0,
            daily_trend: None,
            expensive_day: "Unknown".to_string(),
            expensive_day_amount: 0,
            top_category: UNCATEGORIZED.to_string(),
            top_category_percent: 0,
            transaction_frequency: 0.0,
        }
    }
}

pub fn core_insights(records: &[TransactionRecord], now: NaiveDateTime) -> CoreInsights {
    if records.is_empty() {
        return CoreInsights::empty();
    }

    let recent = select_window(records, now, MONTH_DAYS);
    let total = total_amount(&recent);
    let daily_average = round_half_up(total / MONTH_DAYS as f64);

    let previous = select_between(
        records,
        now - Duration::days(2 * MONTH_DAYS),
        now - Duration::days(MONTH_DAYS),
    );
    let previous_daily = total_amount(&previous) / MONTH_DAYS as f64;
    let daily_trend = compute_trend_with(
        daily_average as f64,
        previous_daily,
        TrendPolicy::DAILY_BADGE,
    );

    let mut by_weekday: BucketMap<Weekday> = BucketMap::with_keys(WEEKDAYS);
    for (day, day_records) in bucket_by_weekday(recent.iter().copied()) {
        for record in day_records {
            by_weekday.add(day, record.amount);
        }
    }
    let (expensive_day, expensive_avg) = top_by(&by_weekday, |b| b.average())
        .map(|(day, avg)| (*day, avg))
        .unwrap_or((Weekday::Sun, 0.0));

    let categories = by_category(&recent);
    let (top_category, top_total) = top_by(&categories, |b| b.total)
        .map(|(name, t)| (name.clone(), t))
        .unwrap_or_else(|| (UNCATEGORIZED.to_string(), 0.0));

    CoreInsights {
        daily_average,
        daily_trend: Some(daily_trend),
        expensive_day: weekday_name(expensive_day).to_string(),
        expensive_day_amount: round_half_up(expensive_avg),
        top_category,
        top_category_percent: round_half_up(safe_percent(top_total, total)),
        transaction_frequency: one_decimal(recent.len() as f64 / MONTH_DAYS as f64),
    }
}

fn one_decimal(value: f64) -> f64 {
    round_half_up(value * 10.0) as f64 / 10.0
}

/// How much of the categorization the classifier is doing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiStats {
    /// Percent of last-7-day records categorized automatically
    pub accuracy: i64,
    /// Records in the last 7 days
    pub processed: usize,
    /// Distinct merchants the classifier has categorized
    pub learned: usize,
    /// Change in accuracy vs the week before, in points
    pub improvement: i64,
}

pub fn ai_stats(records: &[TransactionRecord], now: NaiveDateTime) -> AiStats {
    if records.is_empty() {
        return AiStats::default();
    }

    let this_week = select_window(records, now, 7);
    let previous_week = select_between(
        records,
        now - Duration::days(14),
        now - Duration::days(7),
    );
    let accuracy = round_half_up(auto_share(&this_week));

    let learned: HashSet<String> = records
        .iter()
        .filter(|r| r.is_auto_categorized)
        .map(|r| r.description.trim().to_lowercase())
        .filter(|d| !d.is_empty())
        .collect();

    AiStats {
        accuracy,
        processed: this_week.len(),
        learned: learned.len(),
        improvement: round_half_up(accuracy as f64 - auto_share(&previous_week)),
    }
}

fn auto_share(records: &[&TransactionRecord]) -> f64 {
    let auto = records.iter().filter(|r| r.is_auto_categorized).count();
    safe_percent(auto as f64, records.len() as f64)
}

/// One day of the spending chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
    pub ai_count: usize,
    pub manual_count: usize,
}

/// 30 calendar days ending today, oldest first, zero-filled
pub fn daily_series(records: &[TransactionRecord], now: NaiveDateTime) -> Vec<DailyPoint> {
    let today = now.date();
    let first = today - Duration::days(SERIES_DAYS - 1);

    let mut points: Vec<DailyPoint> = (0..SERIES_DAYS)
        .map(|offset| DailyPoint {
            date: first + Duration::days(offset),
            amount: 0.0,
            ai_count: 0,
            manual_count: 0,
        })
        .collect();

    let start = day_start(now) - Duration::days(SERIES_DAYS - 1);
    for record in select_between(records, start, now) {
        let Some(date) = record.date() else { continue };
        let slot = (date - first).num_days() as usize;
        if let Some(point) = points.get_mut(slot) {
            point.amount += record.amount;
            if record.is_auto_categorized {
                point.ai_count += 1;
            } else {
                point.manual_count += 1;
            }
        }
    }
    points
}
