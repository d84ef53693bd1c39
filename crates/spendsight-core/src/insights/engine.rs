//! Insight Engine - runs every analyzer over one snapshot of records

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dashboard::{DashboardConfig, DashboardSummary};
use crate::models::{PurchaseHour, TransactionRecord};

use super::alerts::{all_clear, CategorySpikeAlert, DuplicateSubscriptionAlert, NightPurchaseAlert};
use super::forecast::{forecast_next, monthly_totals};
use super::overview::{ai_stats, core_insights, daily_series, AiStats, CoreInsights, DailyPoint};
use super::patterns::{canned_patterns, InstallmentPattern, SmallPurchasePattern, WeekendPattern};
use super::recommendations::{
    canned_recommendations, keep_it_up, DeliveryRecommendation, NightPurchaseRecommendation,
    SubscriptionReviewRecommendation,
};
use super::types::{Alert, Pattern, Prediction, Recommendation};

/// Thresholds and vocabularies used by the analyzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    // Category spike alert
    pub spike_critical_percent: i64,
    pub spike_critical_min_total: f64,
    pub spike_warning_percent: i64,
    pub spike_warning_min_total: f64,

    // Night purchases: hour >= night_start_hour || hour <= night_end_hour
    pub night_start_hour: u32,
    pub night_end_hour: u32,
    pub night_alert_min_count: usize,
    /// Treat records that only carry a calendar date as night purchases
    pub date_only_counts_as_night: bool,

    /// Merchants checked for duplicate charges
    pub duplicate_services: Vec<String>,

    // Sample-size gates
    pub pattern_min_records: usize,
    pub recommendation_min_records: usize,
    pub forecast_min_records: usize,

    // Patterns
    pub weekend_ratio: f64,
    pub small_amount_min: f64,
    pub small_amount_max: f64,
    pub small_share: f64,
    pub installment_min_count: usize,

    // Recommendations
    pub delivery_keywords: Vec<String>,
    pub delivery_min_count: usize,
    pub delivery_history_months: u32,
    pub delivery_savings_share: f64,
    pub subscription_keywords: Vec<String>,
    pub subscription_min_services: usize,
    pub subscription_savings_share: f64,
    pub night_min_amount: f64,
    pub night_recommendation_min_count: usize,
    pub night_savings_share: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        let words = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            spike_critical_percent: 50,
            spike_critical_min_total: 500.0,
            spike_warning_percent: 25,
            spike_warning_min_total: 300.0,

            night_start_hour: 22,
            night_end_hour: 6,
            night_alert_min_count: 5,
            date_only_counts_as_night: true,

            duplicate_services: words(&[
                "netflix",
                "spotify",
                "apple",
                "google",
                "amazon",
                "microsoft",
            ]),

            pattern_min_records: 50,
            recommendation_min_records: 30,
            forecast_min_records: 30,

            weekend_ratio: 1.3,
            small_amount_min: 10.0,
            small_amount_max: 100.0,
            small_share: 0.6,
            installment_min_count: 5,

            delivery_keywords: words(&["wolt", "uber", "delivery", "משלוח", "דומינו", "פיצה"]),
            delivery_min_count: 8,
            delivery_history_months: 6,
            delivery_savings_share: 0.4,
            subscription_keywords: words(&[
                "spotify",
                "netflix",
                "apple",
                "google",
                "amazon",
                "microsoft",
                "zoom",
            ]),
            subscription_min_services: 3,
            subscription_savings_share: 0.3,
            night_min_amount: 50.0,
            night_recommendation_min_count: 5,
            night_savings_share: 0.5,
        }
    }
}

impl InsightConfig {
    /// Whether a record's purchase hour falls inside the night window
    pub fn is_night(&self, record: &TransactionRecord) -> bool {
        match record.purchase_hour() {
            PurchaseHour::Known(hour) => {
                hour >= self.night_start_hour || hour <= self.night_end_hour
            }
            PurchaseHour::DateOnly => self.date_only_counts_as_night,
            PurchaseHour::Unknown => false,
        }
    }
}

/// Context provided to analyzers
pub struct AnalysisContext<'a> {
    /// The full normalized snapshot
    pub records: &'a [TransactionRecord],
    /// Reference time; every window is relative to it
    pub now: NaiveDateTime,
    pub config: &'a InsightConfig,
    /// Currency symbol used in finding text
    pub currency: &'a str,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(
        records: &'a [TransactionRecord],
        now: NaiveDateTime,
        config: &'a InsightConfig,
    ) -> Self {
        Self {
            records,
            now,
            config,
            currency: "₪",
        }
    }

    pub fn with_currency(mut self, currency: &'a str) -> Self {
        self.currency = currency;
        self
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Format an amount with the context currency
    pub fn money(&self, amount: f64) -> String {
        crate::fmt::money(self.currency, amount)
    }
}

/// A rule that scans the snapshot and emits findings
pub trait Detector: Send + Sync {
    type Output;

    /// Human-readable name, used in logs
    fn name(&self) -> &'static str;

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Vec<Self::Output>;
}

/// Everything derived from one snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSnapshot {
    pub generated_at: NaiveDateTime,
    pub record_count: usize,
    pub insights: CoreInsights,
    pub stats: AiStats,
    pub alerts: Vec<Alert>,
    pub predictions: Vec<Prediction>,
    pub patterns: Vec<Pattern>,
    pub recommendations: Vec<Recommendation>,
    pub daily_series: Vec<DailyPoint>,
    pub dashboard: DashboardSummary,
}

/// Runs registered analyzers in registration order
pub struct InsightEngine {
    alerts: Vec<Box<dyn Detector<Output = Alert>>>,
    patterns: Vec<Box<dyn Detector<Output = Pattern>>>,
    recommendations: Vec<Box<dyn Detector<Output = Recommendation>>>,
    dashboard: DashboardConfig,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in analyzers
    pub fn new() -> Self {
        let mut engine = Self::empty();

        engine.register_alert(Box::new(CategorySpikeAlert));
        engine.register_alert(Box::new(NightPurchaseAlert));
        engine.register_alert(Box::new(DuplicateSubscriptionAlert));

        engine.register_pattern(Box::new(WeekendPattern));
        engine.register_pattern(Box::new(SmallPurchasePattern));
        engine.register_pattern(Box::new(InstallmentPattern));

        engine.register_recommendation(Box::new(DeliveryRecommendation));
        engine.register_recommendation(Box::new(SubscriptionReviewRecommendation));
        engine.register_recommendation(Box::new(NightPurchaseRecommendation));

        engine
    }

    /// An engine with no analyzers registered
    pub fn empty() -> Self {
        Self {
            alerts: vec![],
            patterns: vec![],
            recommendations: vec![],
            dashboard: DashboardConfig::default(),
        }
    }

    pub fn with_dashboard(mut self, dashboard: DashboardConfig) -> Self {
        self.dashboard = dashboard;
        self
    }

    pub fn register_alert(&mut self, detector: Box<dyn Detector<Output = Alert>>) {
        self.alerts.push(detector);
    }

    pub fn register_pattern(&mut self, detector: Box<dyn Detector<Output = Pattern>>) {
        self.patterns.push(detector);
    }

    pub fn register_recommendation(
        &mut self,
        detector: Box<dyn Detector<Output = Recommendation>>,
    ) {
        self.recommendations.push(detector);
    }

    /// Alerts in detector order; a single all-clear when nothing fires
    pub fn alerts(&self, ctx: &AnalysisContext<'_>) -> Vec<Alert> {
        let mut alerts = run_all(&self.alerts, ctx);
        if alerts.is_empty() {
            alerts.push(all_clear());
        }
        alerts
    }

    /// Patterns, or the canned set when the sample is too small
    pub fn patterns(&self, ctx: &AnalysisContext<'_>) -> Vec<Pattern> {
        if ctx.record_count() < ctx.config.pattern_min_records {
            tracing::debug!(
                records = ctx.record_count(),
                "Too few records for pattern analysis, using placeholders"
            );
            return canned_patterns();
        }
        run_all(&self.patterns, ctx)
    }

    /// Recommendations, or the canned set when the sample is too small
    pub fn recommendations(&self, ctx: &AnalysisContext<'_>) -> Vec<Recommendation> {
        if ctx.record_count() < ctx.config.recommendation_min_records {
            tracing::debug!(
                records = ctx.record_count(),
                "Too few records for recommendations, using placeholders"
            );
            return canned_recommendations();
        }
        let mut recommendations = run_all(&self.recommendations, ctx);
        if recommendations.is_empty() {
            recommendations.push(keep_it_up());
        }
        recommendations
    }

    pub fn predictions(&self, ctx: &AnalysisContext<'_>) -> Vec<Prediction> {
        let totals = monthly_totals(ctx.records);
        forecast_next(&totals, ctx.record_count(), ctx.config)
    }

    /// Compute the full snapshot
    pub fn analyze(&self, ctx: &AnalysisContext<'_>) -> InsightSnapshot {
        let snapshot = InsightSnapshot {
            generated_at: ctx.now,
            record_count: ctx.record_count(),
            insights: core_insights(ctx.records, ctx.now),
            stats: ai_stats(ctx.records, ctx.now),
            alerts: self.alerts(ctx),
            predictions: self.predictions(ctx),
            patterns: self.patterns(ctx),
            recommendations: self.recommendations(ctx),
            daily_series: daily_series(ctx.records, ctx.now),
            dashboard: DashboardSummary::build(ctx.records, ctx.now, &self.dashboard),
        };

        tracing::debug!(
            records = snapshot.record_count,
            alerts = snapshot.alerts.len(),
            patterns = snapshot.patterns.len(),
            recommendations = snapshot.recommendations.len(),
            "Insight analysis complete"
        );

        snapshot
    }
}

fn run_all<T>(detectors: &[Box<dyn Detector<Output = T>>], ctx: &AnalysisContext<'_>) -> Vec<T> {
    let mut findings = vec![];
    for detector in detectors {
        let found = detector.analyze(ctx);
        tracing::debug!(
            detector = detector.name(),
            count = found.len(),
            "Detector complete"
        );
        findings.extend(found);
    }
    findings
}
