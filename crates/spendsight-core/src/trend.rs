//! Trend classification
//!
//! Two threshold policies exist on purpose: monthly comparisons and the
//! forecast use ±10%, the daily-average badge uses ±5%.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::aggregate::round_half_up;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Increase,
    Decrease,
    Stable,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Increase => "increase",
            TrendLabel::Decrease => "decrease",
            TrendLabel::Stable => "stable",
        }
    }
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Thresholds (in whole percent) for labelling a delta
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPolicy {
    /// Strictly above this is an increase
    pub up: f64,
    /// Strictly below this is a decrease
    pub down: f64,
}

impl TrendPolicy {
    pub const MONTHLY: TrendPolicy = TrendPolicy {
        up: 10.0,
        down: -10.0,
    };

    pub const DAILY_BADGE: TrendPolicy = TrendPolicy {
        up: 5.0,
        down: -5.0,
    };

    pub fn classify(&self, percent: f64) -> TrendLabel {
        if percent > self.up {
            TrendLabel::Increase
        } else if percent < self.down {
            TrendLabel::Decrease
        } else {
            TrendLabel::Stable
        }
    }
}

/// Rounded percent delta and its label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trend {
    pub percent: i64,
    pub label: TrendLabel,
}

/// Signed percent change from `prior` to `recent`, unrounded; 0 when `prior <= 0`
pub fn percent_change(recent: f64, prior: f64) -> f64 {
    if prior > 0.0 {
        (recent - prior) / prior * 100.0
    } else {
        0.0
    }
}

/// Compare two totals under the monthly policy
pub fn compute_trend(recent: f64, prior: f64) -> Trend {
    compute_trend_with(recent, prior, TrendPolicy::MONTHLY)
}

/// Compare two totals under an explicit policy
pub fn compute_trend_with(recent: f64, prior: f64, policy: TrendPolicy) -> Trend {
    let percent = round_half_up(percent_change(recent, prior));
    Trend {
        percent,
        label: policy.classify(percent as f64),
    }
}

/// Forecast confidence for a trend: `clamp(85 - |percent|, 60, 90)`
pub fn forecast_confidence(percent: f64) -> u8 {
    let raw = 85.0 - percent.abs();
    round_half_up(raw.clamp(60.0, 90.0)) as u8
}

/// Confidence for the second forecast horizon, never negative
pub fn second_horizon_confidence(confidence: u8) -> u8 {
    confidence.saturating_sub(15)
}
