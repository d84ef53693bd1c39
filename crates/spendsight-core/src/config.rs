//! Application configuration
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the user config dir
//!    (~/.config/spendsight/config.toml) when it exists
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Backend URL, backend key and suggestion service URL may also come from
//! `SPENDSIGHT_BACKEND_URL`, `SPENDSIGHT_BACKEND_KEY` and
//! `SPENDSIGHT_SUGGESTIONS_URL`; environment values win over files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::dashboard::DashboardConfig;
use crate::error::{Error, Result};
use crate::insights::InsightConfig;
use crate::normalize::NormalizeOptions;

/// Embedded default config (compiled into binary)
/// Longest fetch window accepted from config
pub const MAX_WINDOW_MONTHS: u32 = 120;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

pub const ENV_BACKEND_URL: &str = "SPENDSIGHT_BACKEND_URL";
pub const ENV_BACKEND_KEY: &str = "SPENDSIGHT_BACKEND_KEY";
pub const ENV_SUGGESTIONS_URL: &str = "SPENDSIGHT_SUGGESTIONS_URL";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub suggestions: SuggestionsConfig,
    pub display: DisplayConfig,
    pub insights: InsightConfig,
    pub dashboard: DashboardConfig,
}

/// Managed backend (PostgREST-style) connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub url: Option<String>,
    /// Anonymous API key; prefer the environment over the file
    pub api_key: Option<String>,
    pub transactions_table: String,
    pub categories_table: String,
    /// How many months of history to fetch
    pub window_months: u32,
    /// Maximum number of rows per fetch
    pub limit: u32,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            transactions_table: "transactions".to_string(),
            categories_table: "categories".to_string(),
            window_months: 6,
            limit: 3000,
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Optional remote suggestion service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
        }
    }
}

impl SuggestionsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub currency_symbol: String,
    /// Offset applied to RFC 3339 timestamps before reading hours and dates
    pub utc_offset_minutes: i32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₪".to_string(),
            utc_offset_minutes: 0,
        }
    }
}

impl DisplayConfig {
    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                Error::Config(format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

impl AppConfig {
    /// Load configuration (explicit path or user override first, then embedded default)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                fs::read_to_string(path)?
            }
            None => match default_config_path() {
                Some(default_path) if default_path.exists() => {
                    tracing::debug!(path = %default_path.display(), "Using config override");
                    fs::read_to_string(&default_path)?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        let config = Self::from_toml(&content)?.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections keep their defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Embedded defaults
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend.url = Some(url);
        }
        if let Some(key) = lookup(ENV_BACKEND_KEY) {
            self.backend.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_SUGGESTIONS_URL) {
            self.suggestions.url = Some(url);
        }
        self
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        self.display.utc_offset()?;
        if !(1..=MAX_WINDOW_MONTHS).contains(&self.backend.window_months) {
            return Err(Error::Config(format!(
                "backend.window_months must be between 1 and {}",
                MAX_WINDOW_MONTHS
            )));
        }
        if self.backend.timeout_secs == 0 || self.suggestions.timeout_secs == 0 {
            return Err(Error::Config("timeouts must be at least 1 second".into()));
        }
        self.dashboard.validate()
    }

    /// Normalization options derived from the display settings
    pub fn normalize_options(&self) -> Result<NormalizeOptions> {
        Ok(NormalizeOptions {
            utc_offset: self.display.utc_offset()?,
        })
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("spendsight").join("config.toml"))
}
