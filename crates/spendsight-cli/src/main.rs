//! Spendsight CLI - personal spending insights
//!
//! Usage:
//!   spendsight insights               Full insight report
//!   spendsight dashboard              This month's KPIs and series
//!   spendsight alerts --json          Alerts as JSON
//!   spendsight alerts --min-severity warning
//!   spendsight --file tx.json ...     Use a JSON snapshot instead of the backend

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact().with_writer(std::io::stderr))
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let now = commands::resolve_now(cli.now.as_deref(), &config)?;
    let file = cli.file.as_deref();

    match cli.command {
        Commands::Insights => commands::cmd_insights(&config, file, now, cli.json).await,
        Commands::Dashboard => commands::cmd_dashboard(&config, file, now, cli.json).await,
        Commands::Alerts { min_severity } => {
            commands::cmd_alerts(&config, file, now, min_severity, cli.json).await
        }
        Commands::Forecast => commands::cmd_forecast(&config, file, now, cli.json).await,
        Commands::Suggestions { action } => {
            let client = commands::suggestion_client(&config)?;
            match action {
                None | Some(SuggestionsAction::List) => {
                    commands::cmd_suggestions_list(&client, cli.json).await
                }
                Some(SuggestionsAction::New) => {
                    commands::cmd_suggestions_new(&client, &config, cli.json).await
                }
                Some(SuggestionsAction::Accept { business, category }) => {
                    commands::cmd_suggestions_accept(&client, &business, &category).await
                }
                Some(SuggestionsAction::Reject { business }) => {
                    commands::cmd_suggestions_reject(&client, &business).await
                }
                Some(SuggestionsAction::Approve { business, category }) => {
                    commands::cmd_suggestions_approve(&client, &business, &category).await
                }
            }
        }
        Commands::Config => commands::cmd_config_show(&config, cli.config.as_deref()),
    }
}
