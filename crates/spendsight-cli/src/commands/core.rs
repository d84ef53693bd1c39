//! Shared command utilities

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use spendsight_core::{
    pipeline, AppConfig, InsightSnapshot, JsonFileSource, RestSource, TransactionSource,
};

/// Load configuration from `--config`, the user override or built-in defaults
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load configuration")
}

/// Parse `--now`, or read the clock in the configured display offset
pub fn resolve_now(value: Option<&str>, config: &AppConfig) -> Result<NaiveDateTime> {
    let Some(value) = value else {
        let offset = config.display.utc_offset()?;
        return Ok(Utc::now().with_timezone(&offset).naive_local());
    };

    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        // the whole day counts as elapsed
        return date
            .succ_opt()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .context("--now is out of range");
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(ts);
        }
    }
    anyhow::bail!(
        "Invalid --now value: {} (use YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])",
        value
    )
}

/// Pick the snapshot file when given, the configured backend otherwise
pub fn open_source(config: &AppConfig, file: Option<&Path>) -> Result<Box<dyn TransactionSource>> {
    if let Some(path) = file {
        let source = JsonFileSource::new(path)
            .with_limit(config.backend.limit as usize)
            .with_normalize_options(config.normalize_options()?);
        return Ok(Box::new(source));
    }

    let source = RestSource::from_config(&config.backend).context(
        "No backend configured: set SPENDSIGHT_BACKEND_URL (or [backend] url) or pass --file",
    )?;
    Ok(Box::new(source))
}

/// Run the full pipeline for a command
pub async fn build_snapshot(
    config: &AppConfig,
    file: Option<&Path>,
    now: NaiveDateTime,
) -> Result<InsightSnapshot> {
    let source = open_source(config, file)?;
    pipeline::run(source.as_ref(), config, now)
        .await
        .context("Failed to compute insights")
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
