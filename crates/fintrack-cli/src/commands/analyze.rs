//! All-in-one analysis batch
//!
//! Loads the data once, then runs each step in order. A failed load aborts;
//! a failed step is logged and the batch moves on.

use std::path::PathBuf;

use anyhow::{Context, Result};
use fintrack_core::analytics::DEFAULT_TREND_MONTHS;
use fintrack_core::export::{export_transactions, write_dashboard, write_monthly_report};
use fintrack_core::import::{import_csv, TransactionsApiClient};
use fintrack_core::{Analyzer, ApiConfig, Database};
use tracing::{error, warn};

use super::format_money;
use super::reports::{print_report_summary, print_trends};

/// Anomalies listed in the batch output
const ANOMALIES_SHOWN: usize = 5;

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub user_id: Option<i64>,
    /// Report month; the report step is skipped without it
    pub month: Option<u32>,
    pub year: i32,
    pub output_dir: PathBuf,
    pub export_csv: Option<PathBuf>,
    pub import_csv: Option<PathBuf>,
}

/// What a batch run produced
#[derive(Debug, Default)]
pub struct AnalyzeSummary {
    pub report_path: Option<PathBuf>,
    pub dashboard_path: Option<PathBuf>,
    pub anomalies: usize,
    pub imported: Option<usize>,
    pub exported: Option<usize>,
    /// Names of steps that failed
    pub failed_steps: Vec<&'static str>,
}

pub async fn cmd_analyze(db: &Database, api: &ApiConfig, opts: &AnalyzeOptions) -> Result<()> {
    let summary = run_analyze(db, api, opts).await?;
    if !summary.failed_steps.is_empty() {
        println!();
        println!(
            "⚠️  Finished with failed steps: {}",
            summary.failed_steps.join(", ")
        );
    }
    Ok(())
}

/// Run every step, returning what was produced
pub async fn run_analyze(
    db: &Database,
    api: &ApiConfig,
    opts: &AnalyzeOptions,
) -> Result<AnalyzeSummary> {
    let dataset = db.load_dataset(opts.user_id).context("Failed to load data")?;
    let analyzer = Analyzer::new(dataset);
    let mut summary = AnalyzeSummary::default();

    if let Some(month) = opts.month {
        if let Some(report) = analyzer.generate_monthly_report(opts.year, month, opts.user_id) {
            print_report_summary(&report);
            match write_monthly_report(&report, &opts.output_dir, month, opts.year) {
                Ok(path) => summary.report_path = Some(path),
                Err(e) => {
                    error!("Failed to export report: {}", e);
                    summary.failed_steps.push("report");
                }
            }
        }
    }

    let trends = analyzer.calculate_trends(DEFAULT_TREND_MONTHS, opts.user_id);
    if !trends.monthly_data.is_empty() {
        print_trends(&trends);
    }

    let anomalies = analyzer.detect_anomalies(opts.user_id);
    summary.anomalies = anomalies.len();
    if !anomalies.is_empty() {
        println!();
        println!("⚠️  Detected {} spending anomalies:", anomalies.len());
        for anomaly in anomalies.iter().take(ANOMALIES_SHOWN) {
            println!(
                "  • {}: {} ({})",
                anomaly.description,
                format_money(anomaly.amount),
                anomaly.category
            );
        }
    }

    match write_dashboard(&analyzer.build_dashboard(opts.user_id), &opts.output_dir) {
        Ok(path) => {
            println!();
            println!("✅ Visualizations saved to {}", path.display());
            summary.dashboard_path = Some(path);
        }
        Err(e) => {
            error!("Failed to write dashboard data: {}", e);
            summary.failed_steps.push("dashboard");
        }
    }

    if let Some(file) = &opts.import_csv {
        match opts.user_id {
            Some(user_id) => {
                let client = TransactionsApiClient::new(&api.base_url);
                match import_csv(file, user_id, &client).await {
                    Ok(stats) => {
                        println!(
                            "✅ Successfully imported {}/{} transactions",
                            stats.imported, stats.total
                        );
                        summary.imported = Some(stats.imported);
                    }
                    Err(e) => {
                        error!("Error importing CSV: {}", e);
                        summary.failed_steps.push("import");
                    }
                }
            }
            None => warn!("Skipping import of {}: --user-id is required", file.display()),
        }
    }

    if let Some(file) = &opts.export_csv {
        match export_transactions(file, analyzer.transactions_for(opts.user_id)) {
            Ok(count) => {
                println!("✅ Data exported to {}", file.display());
                summary.exported = Some(count);
            }
            Err(e) => {
                error!("Failed to export data: {}", e);
                summary.failed_steps.push("export");
            }
        }
    }

    Ok(summary)
}
