//! Dashboard command

use std::path::Path;

use anyhow::Result;
use chrono::NaiveDateTime;
use spendsight_core::fmt::money;
use spendsight_core::AppConfig;

use super::{build_snapshot, print_json, truncate};

pub async fn cmd_dashboard(
    config: &AppConfig,
    file: Option<&Path>,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let snapshot = build_snapshot(config, file, now).await?;
    let dashboard = &snapshot.dashboard;
    if json {
        return print_json(dashboard);
    }

    let currency = config.display.currency_symbol.as_str();
    let stats = &dashboard.this_month;

    println!();
    println!("📊 Spendsight Dashboard - {}", dashboard.month);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Spent this month:  {}", money(currency, stats.total));
    println!("   Transactions:      {}", stats.count);
    println!("   Average purchase:  {}", money(currency, stats.average));
    println!("   Top category:      {}", stats.top_category);

    println!();
    println!("📅 Monthly");
    if dashboard.monthly.is_empty() {
        println!("   No spending recorded.");
    }
    for point in &dashboard.monthly {
        println!("   {}  {:>12}", point.month, money(currency, point.amount));
    }

    println!();
    println!("🗓️  Weekly (week starting)");
    for point in &dashboard.weekly {
        println!(
            "   {}  {:>12}  {:>4} purchases",
            point.week,
            money(currency, point.amount),
            point.count
        );
    }

    println!();
    println!("🏷️  Categories");
    if !dashboard.categories.is_empty() {
        println!(
            "   {:25} │ {:>12} │ {:>5} │ {}",
            "Category", "Amount", "Count", "Color"
        );
        println!("   ──────────────────────────┼──────────────┼───────┼─────────");
    }
    for slice in &dashboard.categories {
        println!(
            "   {:25} │ {:>12} │ {:>5} │ {}",
            truncate(&slice.name, 25),
            money(currency, slice.amount),
            slice.count,
            slice.color
        );
    }

    println!();
    println!("📆 Last {} days", dashboard.daily.len());
    for point in &dashboard.daily {
        println!(
            "   {}  {:>12}  {:>4} purchases",
            point.day.format("%a %d/%m"),
            money(currency, point.amount),
            point.count
        );
    }

    println!();
    println!("🧾 Recent transactions");
    if dashboard.recent.is_empty() {
        println!("   No transactions.");
    }
    for tx in &dashboard.recent {
        let date = tx
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        let installment = tx
            .installment
            .as_deref()
            .map(|i| format!("  ({})", i))
            .unwrap_or_default();
        println!(
            "   {}  {:30} {:>10}  {}{}",
            date,
            truncate(&tx.description, 30),
            money(currency, tx.amount),
            tx.category,
            installment
        );
    }

    Ok(())
}
