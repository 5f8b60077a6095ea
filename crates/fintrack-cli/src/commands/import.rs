//! Import/export command implementations

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::export::export_transactions;
use fintrack_core::import::{import_csv, TransactionsApiClient};
use fintrack_core::{Analyzer, ApiConfig, ImportStats};

/// Import a CSV file through the transactions API
pub async fn cmd_import(api: &ApiConfig, file: &Path, user_id: Option<i64>) -> Result<()> {
    let Some(user_id) = user_id else {
        anyhow::bail!("Import requires --user-id");
    };

    println!("📥 Importing {} for user {}...", file.display(), user_id);

    let client = TransactionsApiClient::new(&api.base_url);
    let stats = import_csv(file, user_id, &client)
        .await
        .with_context(|| format!("Error importing {}", file.display()))?;

    print_import_stats(&stats);
    Ok(())
}

fn print_import_stats(stats: &ImportStats) {
    println!(
        "✅ Successfully imported {}/{} transactions",
        stats.imported, stats.total
    );
    if stats.failed > 0 {
        println!("   ❌ Rejected by API: {}", stats.failed);
    }
    if stats.invalid > 0 {
        println!("   ⚠️  Invalid rows skipped: {}", stats.invalid);
    }
    if stats.skipped > 0 {
        println!("   Skipped (type not INCOME/EXPENSE): {}", stats.skipped);
    }
}

/// Export the loaded transactions to a file
pub fn cmd_export(analyzer: &Analyzer, file: &Path, user_id: Option<i64>) -> Result<()> {
    let count = export_transactions(file, analyzer.transactions_for(user_id))
        .with_context(|| format!("Failed to export to {}", file.display()))?;

    println!("✅ Data exported to {} ({} transactions)", file.display(), count);
    Ok(())
}
