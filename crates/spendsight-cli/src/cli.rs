//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spendsight_core::Severity;

/// Spendsight - see where the money goes
#[derive(Parser)]
#[command(name = "spendsight")]
#[command(about = "Spending insights, alerts and forecasts from your card transactions", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.config/spendsight/config.toml, then built-in defaults)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read transactions from a JSON snapshot instead of the backend
    ///
    /// Accepts `{"transactions": [...], "categories": [...]}` or a bare
    /// array of transaction rows.
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Reference time for every window (YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS])
    #[arg(long, global = true)]
    pub now: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Headline numbers, alerts, patterns, recommendations and forecast
    Insights,

    /// This month's KPIs and chart series
    Dashboard,

    /// Spending alerts only
    Alerts {
        /// Hide alerts below this severity (success, info, warning, critical)
        #[arg(long)]
        min_severity: Option<Severity>,
    },

    /// Two-month spend forecast
    Forecast,

    /// Categorization suggestions from the suggestion service
    Suggestions {
        #[command(subcommand)]
        action: Option<SuggestionsAction>,
    },

    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum SuggestionsAction {
    /// List suggested category changes
    List,

    /// List merchants waiting for their first category
    New,

    /// Accept a suggested category for a merchant
    Accept {
        /// Merchant name as shown in the list
        business: String,

        /// Recommended category
        category: String,
    },

    /// Reject the suggestion for a merchant
    Reject {
        /// Merchant name as shown in the list
        business: String,
    },

    /// Assign a category to a new merchant
    Approve {
        /// Merchant name as shown in the list
        business: String,

        /// Category to assign
        category: String,
    },
}
