//! Alert detectors
//!
//! - **Category spike** - this week's spend per category vs last month's weekly average
//! - **Night purchases** - a cluster of late-night purchases this week
//! - **Duplicate subscriptions** - repeated charges from a well-known service

use chrono::Duration;

use crate::aggregate::{by_category, round_half_up, total_amount};
use crate::window::{select_between, select_window};

use super::engine::{AnalysisContext, Detector};
use super::keyword_matches;
use super::types::{Alert, AlertKind, Impact, ImpactPeriod, Severity};

/// Weeks in the baseline month
const BASELINE_WEEKS: f64 = 4.0;

/// Flags categories whose spend this week jumped above last month's weekly average
///
/// This week is `[now-7d, now)`; last month is `[now-60d, now-30d)`. A
/// category with no spend last month has no baseline and is skipped.
pub struct CategorySpikeAlert;

impl Detector for CategorySpikeAlert {
    type Output = Alert;

    fn name(&self) -> &'static str {
        "Category Spike"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Alert> {
        let cfg = ctx.config;
        let this_week = select_window(ctx.records, ctx.now, 7);
        let last_month = select_between(
            ctx.records,
            ctx.now - Duration::days(60),
            ctx.now - Duration::days(30),
        );

        let weekly = by_category(&this_week);
        let baseline = by_category(&last_month);

        let mut alerts = Vec::new();
        for (category, week) in weekly.iter() {
            let Some(base) = baseline.get(category) else {
                continue;
            };

            let weekly_avg = base.total / BASELINE_WEEKS;
            let increase = if weekly_avg > 0.0 {
                round_half_up((week.total - weekly_avg) / weekly_avg * 100.0)
            } else {
                0
            };

            if increase > cfg.spike_critical_percent && week.total > cfg.spike_critical_min_total {
                alerts.push(Alert::new(
                    AlertKind::CategorySpike,
                    Severity::Critical,
                    "Unusual spending detected",
                    format!(
                        "{} on {} this week - {}% above the weekly average",
                        ctx.money(week.total),
                        category,
                        increase
                    ),
                ));
            } else if increase > cfg.spike_warning_percent
                && week.total > cfg.spike_warning_min_total
            {
                alerts.push(Alert::new(
                    AlertKind::CategorySpike,
                    Severity::Warning,
                    "Upward trend detected",
                    format!("{} spending is up {}% this week", category, increase),
                ));
            }
        }
        alerts
    }
}

/// Flags a cluster of night-time purchases in the last 7 days
pub struct NightPurchaseAlert;

impl Detector for NightPurchaseAlert {
    type Output = Alert;

    fn name(&self) -> &'static str {
        "Night Purchases"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Alert> {
        let night: Vec<_> = select_window(ctx.records, ctx.now, 7)
            .into_iter()
            .filter(|r| ctx.config.is_night(r))
            .collect();

        if night.len() <= ctx.config.night_alert_min_count {
            return vec![];
        }

        let total = total_amount(&night);
        vec![Alert::new(
            AlertKind::NightPurchases,
            Severity::Info,
            "Night purchases detected",
            format!(
                "{} purchases late at night this week - {} in total",
                night.len(),
                ctx.money(total)
            ),
        )
        .with_icon("🌙")]
    }
}

/// Flags services charged more than once across the snapshot
pub struct DuplicateSubscriptionAlert;

impl Detector for DuplicateSubscriptionAlert {
    type Output = Alert;

    fn name(&self) -> &'static str {
        "Duplicate Subscriptions"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Alert> {
        keyword_matches(ctx.records, &ctx.config.duplicate_services)
            .into_iter()
            .filter(|(_, matched)| matched.len() > 1)
            .map(|(service, matched)| {
                let saving = round_half_up(total_amount(&matched) / 2.0);
                Alert::new(
                    AlertKind::DuplicateSubscription,
                    Severity::Info,
                    "Possible duplicate subscriptions",
                    format!(
                        "{} charges from {} - potential saving of {}/month",
                        matched.len(),
                        service,
                        ctx.money(saving as f64)
                    ),
                )
                .with_impact(Impact::Amount {
                    amount: saving,
                    period: Some(ImpactPeriod::Month),
                })
            })
            .collect()
    }
}

/// The single alert emitted when nothing else fires
pub fn all_clear() -> Alert {
    Alert::new(
        AlertKind::AllClear,
        Severity::Success,
        "All clear",
        "No unusual spending or worrying patterns this week",
    )
}
