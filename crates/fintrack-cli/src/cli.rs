//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Fintrack - Personal finance analytics
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Personal finance reports, trends and anomaly detection", long_about = None)]
#[command(version)]
pub struct Cli {
    /// User ID to analyze (all users when omitted)
    #[arg(long, global = true)]
    pub user_id: Option<i64>,

    /// Output directory for reports
    #[arg(long, default_value = "reports", global = true)]
    pub output_dir: PathBuf,

    /// Config file (defaults to ~/.config/fintrack/config.toml)
    ///
    /// DB_NAME, DB_PASSWORD and FINTRACK_API_URL override values from the file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database tables if they don't exist
    Init,

    /// Run the full batch: report, trends, anomalies, dashboard, import, export
    Analyze {
        /// Month for the report (1-12); no report without it
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,

        /// Year for the report (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Export transactions to this CSV file
        #[arg(long)]
        export_csv: Option<PathBuf>,

        /// Import transactions from this CSV file (requires --user-id)
        #[arg(long)]
        import_csv: Option<PathBuf>,
    },

    /// Generate and export the monthly report
    Report {
        /// Month (1-12)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,

        /// Year (defaults to the current year)
        #[arg(short, long)]
        year: Option<i32>,
    },

    /// Show month-over-month trends
    Trends {
        /// Length of the trailing window in months
        #[arg(short, long, default_value = "6")]
        months: u32,
    },

    /// List unusually large expenses
    Anomalies {
        /// Number of anomalies to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Write chart data for the dashboard
    Dashboard,

    /// Import transactions from CSV through the transactions API
    Import {
        /// CSV file with description, amount, type, category and date columns
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export transactions (CSV, or JSON for a .json file)
    Export {
        /// Output file
        #[arg(short, long)]
        file: PathBuf,
    },
}
