//! Configuration command

use std::path::Path;

use anyhow::{Context, Result};
use spendsight_core::config::default_config_path;
use spendsight_core::AppConfig;

/// Print the effective configuration with secrets masked
pub fn cmd_config_show(config: &AppConfig, path: Option<&Path>) -> Result<()> {
    let source = match (path, default_config_path()) {
        (Some(p), _) => p.display().to_string(),
        (None, Some(p)) if p.exists() => p.display().to_string(),
        _ => "built-in defaults".to_string(),
    };

    let rendered = toml::to_string_pretty(&masked(config)).context("Failed to render config")?;
    println!("# Loaded from: {}", source);
    println!("{}", rendered);
    Ok(())
}

/// Copy of the config safe to print
pub fn masked(config: &AppConfig) -> AppConfig {
    let mut shown = config.clone();
    if shown.backend.api_key.is_some() {
        shown.backend.api_key = Some("********".to_string());
    }
    shown
}
