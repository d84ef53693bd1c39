//! Suggestion service commands

use anyhow::{Context, Result};
use spendsight_core::fmt::money;
use spendsight_core::suggestions::{load_new_businesses, load_suggestions};
use spendsight_core::{AppConfig, SuggestionClient, SuggestionService};

use super::{print_json, truncate};

/// Build the client from `[suggestions]` / `SPENDSIGHT_SUGGESTIONS_URL`
pub fn suggestion_client(config: &AppConfig) -> Result<SuggestionClient> {
    SuggestionClient::from_config(&config.suggestions)?.context(
        "No suggestion service configured: set SPENDSIGHT_SUGGESTIONS_URL or [suggestions] url",
    )
}

/// List suggested category changes; an unreachable service lists nothing
pub async fn cmd_suggestions_list(client: &dyn SuggestionService, json: bool) -> Result<()> {
    let suggestions = load_suggestions(client).await;
    if json {
        return print_json(&suggestions);
    }

    println!();
    println!("🤖 Categorization suggestions");
    if suggestions.is_empty() {
        println!("   🎉 No suggestions - everything looks categorized.");
        return Ok(());
    }
    println!(
        "   {:30} │ {:18} │ {:18} │ {:>6}",
        "Business", "Current", "Recommended", "Conf."
    );
    println!("   ───────────────────────────────┼────────────────────┼────────────────────┼───────");
    for s in &suggestions {
        println!(
            "   {:30} │ {:18} │ {:18} │ {:>5.0}%",
            truncate(&s.business, 30),
            truncate(&s.current, 18),
            truncate(&s.recommended, 18),
            s.confidence
        );
    }
    Ok(())
}

/// List merchants awaiting their first category
pub async fn cmd_suggestions_new(
    client: &dyn SuggestionService,
    config: &AppConfig,
    json: bool,
) -> Result<()> {
    let businesses = load_new_businesses(client).await;
    if json {
        return print_json(&businesses);
    }

    println!();
    println!("🆕 New businesses");
    if businesses.is_empty() {
        println!("   📋 No new businesses to categorize.");
        return Ok(());
    }
    for b in &businesses {
        println!(
            "   {:>4}  {:30} {:>10}  suggested: {}",
            b.id,
            truncate(&b.name, 30),
            money(&config.display.currency_symbol, b.amount),
            b.suggested.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn cmd_suggestions_accept(
    client: &dyn SuggestionService,
    business: &str,
    category: &str,
) -> Result<()> {
    let result = client
        .accept_suggestion(business, category)
        .await
        .with_context(|| format!("Failed to accept suggestion for {}", business))?;
    println!(
        "✅ {}",
        result
            .message
            .unwrap_or_else(|| format!("Accepted: {} → {}", business, category))
    );
    Ok(())
}

pub async fn cmd_suggestions_reject(client: &dyn SuggestionService, business: &str) -> Result<()> {
    let result = client
        .reject_suggestion(business)
        .await
        .with_context(|| format!("Failed to reject suggestion for {}", business))?;
    println!(
        "❌ {}",
        result
            .message
            .unwrap_or_else(|| format!("Rejected suggestion for {}", business))
    );
    Ok(())
}

pub async fn cmd_suggestions_approve(
    client: &dyn SuggestionService,
    business: &str,
    category: &str,
) -> Result<()> {
    let result = client
        .approve_business(business, category)
        .await
        .with_context(|| format!("Failed to approve {}", business))?;
    println!(
        "✅ {}",
        result
            .message
            .unwrap_or_else(|| format!("Approved: {} → {}", business, category))
    );
    Ok(())
}
