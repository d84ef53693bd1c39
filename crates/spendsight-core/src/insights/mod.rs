//! Insight Engine - rule-based spending insights
//!
//! The engine runs a fixed set of deterministic analyzers over one snapshot
//! of normalized records and a caller-supplied `now`. Nothing is cached
//! between runs; the same input always yields the same snapshot.
//!
//! ## Analyzers
//!
//! - **Alerts** - category spikes, night purchases, duplicate subscriptions
//! - **Patterns** - weekend skew, frequent small purchases, installment clusters
//! - **Recommendations** - delivery spend, subscription review, night purchases
//! - **Forecast** - dampened two-month spend projection
//! - **Overview** - headline numbers, categorization stats, daily chart series
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendsight_core::insights::{AnalysisContext, InsightConfig, InsightEngine};
//!
//! let config = InsightConfig::default();
//! let ctx = AnalysisContext::new(&records, now, &config);
//! let snapshot = InsightEngine::new().analyze(&ctx);
//! ```

pub mod alerts;
pub mod engine;
pub mod forecast;
pub mod overview;
pub mod patterns;
pub mod recommendations;
pub mod types;

pub use engine::{AnalysisContext, Detector, InsightConfig, InsightEngine, InsightSnapshot};
pub use forecast::forecast_next;
pub use overview::{AiStats, CoreInsights, DailyPoint};
pub use types::{
    Alert, AlertKind, Impact, ImpactPeriod, Pattern, PatternKind, Prediction, Recommendation,
    RecommendationKind, Severity,
};

use crate::models::TransactionRecord;

/// Records whose lower-cased description contains each keyword
///
/// Only keywords with at least one match are returned, in the order their
/// first match was seen. A record matching several keywords appears under
/// each of them.
pub(crate) fn keyword_matches<'a>(
    records: &'a [TransactionRecord],
    keywords: &[String],
) -> Vec<(String, Vec<&'a TransactionRecord>)> {
    let mut found: Vec<(String, Vec<&'a TransactionRecord>)> = Vec::new();
    for record in records {
        let description = record.description.to_lowercase();
        for keyword in keywords {
            if !description.contains(keyword.to_lowercase().as_str()) {
                continue;
            }
            match found.iter_mut().find(|(k, _)| k == keyword) {
                Some((_, matched)) => matched.push(record),
                None => found.push((keyword.clone(), vec![record])),
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_keyword_matches_first_seen_order() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let records = vec![
            TransactionRecord::new("1", ts, 10.0).with_description("Google *YouTube"),
            TransactionRecord::new("2", ts, 10.0).with_description("AMAZON PRIME"),
            TransactionRecord::new("3", ts, 10.0).with_description("amazon google bundle"),
            TransactionRecord::new("4", ts, 10.0).with_description("Cafe"),
        ];
        let keywords = vec!["amazon".to_string(), "google".to_string()];

        let found = keyword_matches(&records, &keywords);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0, "google");
        assert_eq!(found[0].1.len(), 2);
        assert_eq!(found[1].0, "amazon");
        assert_eq!(found[1].1.len(), 2);
    }
}
