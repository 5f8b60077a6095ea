//! Fintrack CLI - Personal finance analytics
//!
//! Usage:
//!   fintrack init                          Create the database tables
//!   fintrack analyze --month 3 --year 2024 Run every analysis in one go
//!   fintrack report --month 3              Monthly report as JSON
//!   fintrack import --file tx.csv          Import through the transactions API

mod cli;
mod commands;


use anyhow::Result;
use chrono::Datelike;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main(flavor = "current_thread")]
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
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;
    let current_year = chrono::Local::now().year();

    match cli.command {
        Commands::Init => commands::cmd_init(&config.database),
        Commands::Analyze {
            month,
            year,
            export_csv,
            import_csv,
        } => {
            let opts = commands::AnalyzeOptions {
                user_id: cli.user_id,
                month,
                year: year.unwrap_or(current_year),
                output_dir: cli.output_dir,
                export_csv,
                import_csv,
            };
            let db = commands::open_db(&config.database)?;
            commands::cmd_analyze(&db, &config.api, &opts).await
        }
        Commands::Report { month, year } => {
            let analyzer = commands::load_analyzer(&config.database, cli.user_id)?;
            commands::cmd_report(
                &analyzer,
                year.unwrap_or(current_year),
                month,
                cli.user_id,
                &cli.output_dir,
            )
        }
        Commands::Trends { months } => {
            let analyzer = commands::load_analyzer(&config.database, cli.user_id)?;
            commands::cmd_trends(&analyzer, months, cli.user_id)
        }
        Commands::Anomalies { limit } => {
            let analyzer = commands::load_analyzer(&config.database, cli.user_id)?;
            commands::cmd_anomalies(&analyzer, cli.user_id, limit)
        }
        Commands::Dashboard => {
            let analyzer = commands::load_analyzer(&config.database, cli.user_id)?;
            commands::cmd_dashboard(&analyzer, cli.user_id, &cli.output_dir)
        }
        Commands::Import { file } => commands::cmd_import(&config.api, &file, cli.user_id).await,
        Commands::Export { file } => {
            let analyzer = commands::load_analyzer(&config.database, cli.user_id)?;
            commands::cmd_export(&analyzer, &file, cli.user_id)
        }
    }
}
