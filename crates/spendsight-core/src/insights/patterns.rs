//! Spending pattern detectors
//!
//! Patterns only run on snapshots with enough records; below the gate the
//! engine returns [`canned_patterns`] instead.

use crate::aggregate::{round_half_up, safe_percent, total_amount, Bucket};
use crate::models::TransactionRecord;
use crate::window::{bucket_by_weekday, is_weekend};

use super::engine::{AnalysisContext, Detector};
use super::types::{Impact, Pattern, PatternKind};

/// Weekend days per week and weeks per month, for the monthly extra estimate
const WEEKEND_DAYS: f64 = 2.0;
const WEEKS_PER_MONTH: f64 = 4.0;

/// Friday/Saturday purchases averaging well above the rest of the week
pub struct WeekendPattern;

impl Detector for WeekendPattern {
    type Output = Pattern;

    fn name(&self) -> &'static str {
        "Weekend Skew"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Pattern> {
        let mut weekend = Bucket::default();
        let mut weekday = Bucket::default();
        for (day, records) in bucket_by_weekday(ctx.records) {
            let bucket = if is_weekend(day) {
                &mut weekend
            } else {
                &mut weekday
            };
            for record in records {
                bucket.add(record.amount);
            }
        }

        let (weekend_avg, weekday_avg) = (weekend.average(), weekday.average());
        if weekend_avg <= weekday_avg * ctx.config.weekend_ratio {
            return vec![];
        }

        let diff = weekend_avg - weekday_avg;
        let extra = round_half_up(diff * WEEKEND_DAYS * WEEKS_PER_MONTH);
        vec![Pattern::new(
            PatternKind::Weekend,
            "Weekend pattern",
            format!(
                "Weekend purchases are {}% higher than on weekdays",
                round_half_up(safe_percent(diff, weekday_avg))
            ),
            Impact::Extra { amount: extra },
        )]
    }
}

/// Most purchases are small ones
pub struct SmallPurchasePattern;

impl Detector for SmallPurchasePattern {
    type Output = Pattern;

    fn name(&self) -> &'static str {
        "Frequent Small Purchases"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Pattern> {
        let cfg = ctx.config;
        let small: Vec<&TransactionRecord> = ctx
            .records
            .iter()
            .filter(|r| r.amount > cfg.small_amount_min && r.amount < cfg.small_amount_max)
            .collect();

        if small.len() as f64 <= ctx.record_count() as f64 * cfg.small_share {
            return vec![];
        }

        vec![Pattern::new(
            PatternKind::Frequent,
            "Frequent small purchases",
            format!(
                "{} small purchases ({}-{})",
                small.len(),
                ctx.money(cfg.small_amount_min),
                crate::fmt::whole(cfg.small_amount_max)
            ),
            Impact::Amount {
                amount: round_half_up(total_amount(&small)),
                period: None,
            },
        )]
    }
}

/// Many purchases paid in installments
pub struct InstallmentPattern;

impl Detector for InstallmentPattern {
    type Output = Pattern;

    fn name(&self) -> &'static str {
        "Installment Cluster"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Pattern> {
        let installments: Vec<&TransactionRecord> =
            ctx.records.iter().filter(|r| r.is_installment()).collect();

        if installments.len() <= ctx.config.installment_min_count {
            return vec![];
        }

        let finishing = installments
            .iter()
            .filter_map(|r| r.installment_progress())
            .filter(|p| p.is_last())
            .count();

        let mut description = format!("{} active installment payments", installments.len());
        if finishing > 0 {
            description.push_str(&format!(" ({} on their final payment)", finishing));
        }

        vec![Pattern::new(
            PatternKind::Installments,
            "Spread-out payments",
            description,
            Impact::Amount {
                amount: round_half_up(total_amount(&installments)),
                period: None,
            },
        )]
    }
}

/// Placeholder patterns for snapshots too small to analyze
pub fn canned_patterns() -> Vec<Pattern> {
    vec![
        Pattern::new(
            PatternKind::Weekend,
            "Weekend pattern",
            "Higher leisure spending on weekends",
            Impact::Extra { amount: 150 },
        ),
        Pattern::new(
            PatternKind::Impulse,
            "Impulse purchases",
            "Quick purchases after work hours",
            Impact::Extra { amount: 89 },
        ),
    ]
}
