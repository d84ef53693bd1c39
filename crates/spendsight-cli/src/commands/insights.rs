//! Insight report, alert and forecast commands

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;
use spendsight_core::fmt::money;
use spendsight_core::insights::{
    AiStats, Alert, CoreInsights, Pattern, Prediction, Recommendation,
};
use spendsight_core::{AppConfig, Severity, TrendLabel};

use super::{build_snapshot, print_json, truncate};

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

fn arrow(label: TrendLabel) -> &'static str {
    match label {
        TrendLabel::Increase => "▲",
        TrendLabel::Decrease => "▼",
        TrendLabel::Stable => "●",
    }
}

/// Full insight report
pub async fn cmd_insights(
    config: &AppConfig,
    file: Option<&Path>,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let snapshot = build_snapshot(config, file, now).await?;
    if json {
        return print_json(&snapshot);
    }

    let currency = config.display.currency_symbol.as_str();
    println!();
    println!(
        "💡 Spending Insights  ({} records, as of {})",
        snapshot.record_count,
        snapshot.generated_at.format("%Y-%m-%d %H:%M")
    );
    println!("{}", RULE);
    print_overview(&snapshot.insights, &snapshot.stats, currency);
    print_alerts(&snapshot.alerts, currency);
    print_patterns(&snapshot.patterns, currency);
    print_recommendations(&snapshot.recommendations, currency);
    print_predictions(&snapshot.predictions, currency);
    Ok(())
}

/// Alerts only
pub async fn cmd_alerts(
    config: &AppConfig,
    file: Option<&Path>,
    now: NaiveDateTime,
    min_severity: Option<Severity>,
    json: bool,
) -> Result<()> {
    let snapshot = build_snapshot(config, file, now).await?;
    let alerts = alerts_at_least(snapshot.alerts, min_severity);
    if json {
        return print_json(&alerts);
    }
    print_alerts(&alerts, &config.display.currency_symbol);
    Ok(())
}

/// Keep alerts at or above `min`, in their original order
pub fn alerts_at_least(alerts: Vec<Alert>, min: Option<Severity>) -> Vec<Alert> {
    let Some(min) = min else { return alerts };
    alerts
        .into_iter()
        .filter(|a| a.severity.priority() >= min.priority())
        .collect()
}

/// Forecast only
pub async fn cmd_forecast(
    config: &AppConfig,
    file: Option<&Path>,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let snapshot = build_snapshot(config, file, now).await?;
    if json {
        return print_json(&snapshot.predictions);
    }
    print_predictions(&snapshot.predictions, &config.display.currency_symbol);
    Ok(())
}

fn print_overview(insights: &CoreInsights, stats: &AiStats, currency: &str) {
    let trend = match insights.daily_trend {
        Some(t) => format!("  {} {}% vs previous 30 days", arrow(t.label), t.percent),
        None => String::new(),
    };
    println!(
        "   Daily average:       {}{}",
        money(currency, insights.daily_average as f64),
        trend
    );
    println!(
        "   Most expensive day:  {} ({} per purchase)",
        insights.expensive_day,
        money(currency, insights.expensive_day_amount as f64)
    );
    println!(
        "   Top category:        {} ({}%)",
        insights.top_category, insights.top_category_percent
    );
    println!(
        "   Purchases per day:   {:.1}",
        insights.transaction_frequency
    );
    println!(
        "   Auto-categorized:    {}% of {} this week ({:+} pts), {} merchants learned",
        stats.accuracy, stats.processed, stats.improvement, stats.learned
    );
}

fn print_alerts(alerts: &[Alert], currency: &str) {
    println!();
    println!("🔔 Alerts");
    if alerts.is_empty() {
        println!("   Nothing at this severity.");
    }
    for alert in alerts {
        println!("   {} {} [{}]", alert.icon, alert.title, alert.severity);
        println!("      {}", alert.description);
        if let Some(impact) = &alert.impact {
            println!("      Impact: {}", impact.render(currency));
        }
    }
}

fn print_patterns(patterns: &[Pattern], currency: &str) {
    println!();
    println!("🔎 Patterns");
    if patterns.is_empty() {
        println!("   No notable patterns.");
        return;
    }
    for pattern in patterns {
        println!(
            "   • {:30} {:>12}",
            truncate(&pattern.title, 30),
            pattern.impact.render(currency)
        );
        println!("     {}", pattern.description);
    }
}

fn print_recommendations(recommendations: &[Recommendation], currency: &str) {
    println!();
    println!("💰 Recommendations");
    for rec in recommendations {
        println!(
            "   {} {:30} {:>16}",
            rec.icon,
            truncate(&rec.title, 30),
            rec.impact.render(currency)
        );
        println!("      {}", rec.description);
    }

    if let Some(best) = recommendations
        .iter()
        .filter(|r| r.impact.amount().is_some())
        .max_by_key(|r| r.impact.amount())
    {
        println!();
        println!("   Biggest opportunity: {}", best.title);
    }
}

fn print_predictions(predictions: &[Prediction], currency: &str) {
    println!();
    println!("📈 Forecast");
    println!(
        "   {:15} │ {:>10} │ {:>10} │ {}",
        "Horizon", "Amount", "Confidence", "Trend"
    );
    println!("   ────────────────┼────────────┼────────────┼──────────────────────");
    for prediction in predictions {
        println!(
            "   {:15} │ {:>10} │ {:>9}% │ {} {}",
            prediction.month,
            money(currency, prediction.amount as f64),
            prediction.confidence_percent,
            arrow(prediction.trend),
            prediction.note
        );
    }
}
