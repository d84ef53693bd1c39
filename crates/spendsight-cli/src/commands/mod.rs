//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading, `--now`, source selection, snapshot)
//! - `config` - Effective configuration
//! - `dashboard` - This month's KPIs and chart series
//! - `insights` - Insight report, alerts and forecast
//! - `suggestions` - Suggestion service listing and actions

pub mod config;
pub mod core;
pub mod dashboard;
pub mod insights;
pub mod suggestions;

// Re-export command functions for main.rs
pub use config::*;
pub use core::*;
pub use dashboard::*;
pub use insights::*;
pub use suggestions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
