//! Savings recommendations

use crate::aggregate::{round_half_up, total_amount};
use crate::models::TransactionRecord;

use super::engine::{AnalysisContext, Detector};
use super::keyword_matches;
use super::types::{Impact, ImpactPeriod, Recommendation, RecommendationKind};

const MONTHS_PER_YEAR: f64 = 12.0;

/// Frequent food-delivery orders
pub struct DeliveryRecommendation;

impl Detector for DeliveryRecommendation {
    type Output = Recommendation;

    fn name(&self) -> &'static str {
        "Delivery Spend"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Recommendation> {
        let cfg = ctx.config;
        let keywords: Vec<String> = cfg
            .delivery_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        let orders: Vec<&TransactionRecord> = ctx
            .records
            .iter()
            .filter(|r| {
                let description = r.description.to_lowercase();
                keywords.iter().any(|k| description.contains(k.as_str()))
            })
            .collect();

        if orders.len() <= cfg.delivery_min_count {
            return vec![];
        }

        let months = f64::from(cfg.delivery_history_months.max(1));
        let annual = total_amount(&orders) / months * MONTHS_PER_YEAR;
        vec![Recommendation::new(
            RecommendationKind::ReduceDelivery,
            "🍕",
            "Order less delivery",
            format!(
                "{} delivery orders in {} months - cooking at home could save a lot",
                orders.len(),
                cfg.delivery_history_months
            ),
            Impact::Amount {
                amount: round_half_up(annual * cfg.delivery_savings_share),
                period: Some(ImpactPeriod::Year),
            },
        )]
    }
}

/// Many distinct digital subscriptions
pub struct SubscriptionReviewRecommendation;

impl Detector for SubscriptionReviewRecommendation {
    type Output = Recommendation;

    fn name(&self) -> &'static str {
        "Subscription Review"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Recommendation> {
        let cfg = ctx.config;
        let services = keyword_matches(ctx.records, &cfg.subscription_keywords);
        if services.len() <= cfg.subscription_min_services {
            return vec![];
        }

        let total: f64 = services.iter().map(|(_, matched)| total_amount(matched)).sum();
        vec![Recommendation::new(
            RecommendationKind::ReviewSubscriptions,
            "📱",
            "Manage digital subscriptions",
            format!(
                "{} digital subscriptions found - check which ones you actually use",
                services.len()
            ),
            Impact::Amount {
                amount: round_half_up(total * cfg.subscription_savings_share),
                period: Some(ImpactPeriod::Year),
            },
        )]
    }
}

/// Larger purchases made late at night
pub struct NightPurchaseRecommendation;

impl Detector for NightPurchaseRecommendation {
    type Output = Recommendation;

    fn name(&self) -> &'static str {
        "Night Purchase Habit"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Recommendation> {
        let cfg = ctx.config;
        let night: Vec<&TransactionRecord> = ctx
            .records
            .iter()
            .filter(|r| r.amount > cfg.night_min_amount && cfg.is_night(r))
            .collect();

        if night.len() <= cfg.night_recommendation_min_count {
            return vec![];
        }

        vec![Recommendation::new(
            RecommendationKind::AvoidNightPurchases,
            "🌙",
            "Avoid late-night shopping",
            format!(
                "{} purchases late at night - wait 24 hours before bigger purchases",
                night.len()
            ),
            Impact::Amount {
                amount: round_half_up(total_amount(&night) * cfg.night_savings_share),
                period: Some(ImpactPeriod::Year),
            },
        )]
    }
}

/// Emitted when no other recommendation applies
pub fn keep_it_up() -> Recommendation {
    Recommendation::new(
        RecommendationKind::KeepItUp,
        "💡",
        "Keep it up",
        "Your spending habits look balanced. Keep tracking and check in from time to time",
        Impact::Ongoing,
    )
}

/// Placeholder recommendations for snapshots too small to analyze
pub fn canned_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new(
            RecommendationKind::TrackSubscriptions,
            "📱",
            "Track your subscriptions",
            "Go over your monthly subscriptions and cancel the ones you don't use",
            Impact::Range {
                low: 50,
                high: 150,
                period: ImpactPeriod::Month,
            },
        ),
        Recommendation::new(
            RecommendationKind::PlannedShopping,
            "🛒",
            "Planned shopping",
            "Write a shopping list in advance to avoid impulse purchases",
            Impact::Range {
                low: 100,
                high: 300,
                period: ImpactPeriod::Month,
            },
        ),
    ]
}
