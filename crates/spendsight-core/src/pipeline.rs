//! Fetch, normalize, analyze
//!
//! One run produces one [`InsightSnapshot`]. Remote source failures never
//! abort a run: they are logged and the snapshot is computed over whatever
//! arrived. A local snapshot that cannot be read is an error.

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::insights::{AnalysisContext, InsightEngine, InsightSnapshot};
use crate::models::{RawRecord, TransactionRecord};
use crate::normalize::normalize_with_categories;
use crate::source::TransactionSource;

/// Fetch records from `source` and compute the snapshot as of `now`
pub async fn run(
    source: &dyn TransactionSource,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<InsightSnapshot> {
    let records = load_records(source, config, now).await?;
    let snapshot = analyze_records(&records, config, now);

    info!(
        source = %source.describe(),
        records = snapshot.record_count,
        alerts = snapshot.alerts.len(),
        "Insight snapshot ready"
    );
    Ok(snapshot)
}

/// Fetch and normalize records; a bad config or unreadable local data is an error
pub async fn load_records(
    source: &dyn TransactionSource,
    config: &AppConfig,
    now: NaiveDateTime,
) -> Result<Vec<TransactionRecord>> {
    let opts = config.normalize_options()?;

    let raw: Vec<RawRecord> = match source
        .fetch_recent_transactions(config.backend.window_months, now)
        .await
    {
        Ok(rows) => rows,
        Err(e) if !e.is_recoverable() => return Err(e),
        Err(e) => {
            warn!("Failed to fetch transactions from {}: {}", source.describe(), e);
            vec![]
        }
    };

    let categories = match source.fetch_active_categories().await {
        Ok(categories) => categories,
        Err(e) if !e.is_recoverable() => return Err(e),
        Err(e) => {
            warn!("Failed to fetch categories from {}: {}", source.describe(), e);
            vec![]
        }
    };

    Ok(normalize_with_categories(&raw, &categories, &opts))
}

/// Compute the snapshot over already-normalized records
pub fn analyze_records(
    records: &[TransactionRecord],
    config: &AppConfig,
    now: NaiveDateTime,
) -> InsightSnapshot {
    let ctx = AnalysisContext::new(records, now, &config.insights)
        .with_currency(&config.display.currency_symbol);
    InsightEngine::new()
        .with_dashboard(config.dashboard.clone())
        .analyze(&ctx)
}
