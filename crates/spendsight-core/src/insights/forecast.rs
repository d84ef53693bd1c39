//! Dampened spend forecast
//!
//! Projects the next two calendar months from the average of the last three
//! month totals, nudged by half (then a further 30%) of the trend against
//! the three months before.

use crate::aggregate::round_half_up;
use crate::models::TransactionRecord;
use crate::trend::{
    forecast_confidence, percent_change, second_horizon_confidence, TrendLabel, TrendPolicy,
};
use crate::window::{bucket_by_month, MonthKey};

use super::engine::InsightConfig;
use super::types::Prediction;

const WINDOW_MONTHS: usize = 3;
const FIRST_HORIZON_DAMPING: f64 = 0.5;
const SECOND_HORIZON_DAMPING: f64 = 0.3;

/// Calendar-month totals, oldest first
pub fn monthly_totals(records: &[TransactionRecord]) -> Vec<(MonthKey, f64)> {
    bucket_by_month(records)
        .into_iter()
        .map(|(month, records)| (month, records.iter().map(|r| r.amount).sum()))
        .collect()
}

/// Forecast the next two months
///
/// Below `forecast_min_records` records the canned pair is returned as is.
pub fn forecast_next(
    monthly: &[(MonthKey, f64)],
    record_count: usize,
    config: &InsightConfig,
) -> Vec<Prediction> {
    if record_count < config.forecast_min_records {
        return canned_predictions();
    }

    let split = monthly.len().saturating_sub(WINDOW_MONTHS);
    let (earlier, recent) = monthly.split_at(split);
    let previous = &earlier[earlier.len().saturating_sub(WINDOW_MONTHS)..];

    let recent_avg = mean(recent);
    let previous_avg = if previous.len() < WINDOW_MONTHS {
        recent_avg
    } else {
        mean(previous)
    };

    let trend = percent_change(recent_avg, previous_avg);
    let label = TrendPolicy::MONTHLY.classify(trend);

    let first = round_half_up(recent_avg * (1.0 + trend / 100.0 * FIRST_HORIZON_DAMPING));
    let second = round_half_up(first as f64 * (1.0 + trend / 100.0 * SECOND_HORIZON_DAMPING));
    let confidence = forecast_confidence(trend);

    tracing::debug!(
        months = monthly.len(),
        recent_avg,
        previous_avg,
        trend,
        "Forecast computed"
    );

    vec![
        Prediction {
            month: "Next month".to_string(),
            amount: first,
            confidence_percent: confidence,
            trend: label,
            note: format!("{} expected", describe(label)),
        },
        Prediction {
            month: "In two months".to_string(),
            amount: second,
            confidence_percent: second_horizon_confidence(confidence),
            trend: label,
            note: format!("{} continues", describe(label)),
        },
    ]
}

fn mean(months: &[(MonthKey, f64)]) -> f64 {
    if months.is_empty() {
        return 0.0;
    }
    months.iter().map(|(_, total)| total).sum::<f64>() / months.len() as f64
}

fn describe(label: TrendLabel) -> &'static str {
    match label {
        TrendLabel::Increase => "Increase",
        TrendLabel::Decrease => "Decrease",
        TrendLabel::Stable => "Stability",
    }
}

/// Placeholder forecast for snapshots too small to analyze
pub fn canned_predictions() -> Vec<Prediction> {
    vec![
        Prediction {
            month: "Next month".to_string(),
            amount: 7500,
            confidence_percent: 75,
            trend: TrendLabel::Stable,
            note: "Stability expected".to_string(),
        },
        Prediction {
            month: "In two months".to_string(),
            amount: 7200,
            confidence_percent: 68,
            trend: TrendLabel::Decrease,
            note: "Slight decrease".to_string(),
        },
    ]
}
