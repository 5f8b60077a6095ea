//! Report and data export
//!
//! Supports:
//! - Monthly report JSON (`monthly_report_{month}_{year}.json`)
//! - Dashboard series JSON (`finance_dashboard.json`)
//! - Transaction CSV with user details

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::analytics::{DashboardData, MonthlyReport};
use crate::error::Result;
use crate::models::{Transaction, TransactionType};

/// File name of the dashboard data inside the output directory
pub const DASHBOARD_FILE: &str = "finance_dashboard.json";

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Pick a format from a file extension, CSV unless it ends in `.json`
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

/// Where the report for a month lands
pub fn monthly_report_path(output_dir: &Path, month: u32, year: i32) -> PathBuf {
    output_dir.join(format!("monthly_report_{}_{}.json", month, year))
}

/// Write a monthly report as pretty JSON, creating the directory if needed
pub fn write_monthly_report(
    report: &MonthlyReport,
    output_dir: &Path,
    month: u32,
    year: i32,
) -> Result<PathBuf> {
    let path = monthly_report_path(output_dir, month, year);
    write_json(report, &path)?;
    info!("Report exported to {}", path.display());
    Ok(path)
}

/// Write the dashboard series into `output_dir`
pub fn write_dashboard(data: &DashboardData, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(DASHBOARD_FILE);
    write_json(data, &path)?;
    info!("Dashboard data saved to {}", path.display());
    Ok(path)
}

/// Pretty-print any serializable value to a file
pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// One CSV row; column order is the header order
#[derive(Debug, Serialize)]
struct TransactionRecord<'a> {
    id: i64,
    user_id: i64,
    description: &'a str,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: &'a str,
    transaction_date: String,
    user_name: &'a str,
    email: &'a str,
}

impl<'a> From<&'a Transaction> for TransactionRecord<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            description: &tx.description,
            amount: tx.amount,
            transaction_type: tx.transaction_type,
            category: &tx.category,
            transaction_date: tx.transaction_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            user_name: &tx.user_name,
            email: &tx.email,
        }
    }
}

/// Write transactions as CSV with a header row; returns the row count
pub fn write_transactions_csv<'a, W, I>(writer: W, transactions: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    let mut count = 0;
    for tx in transactions {
        wtr.serialize(TransactionRecord::from(tx))?;
        count += 1;
    }
    if count == 0 {
        // serialize() only emits headers alongside the first record
        wtr.write_record([
            "id",
            "user_id",
            "description",
            "amount",
            "type",
            "category",
            "transaction_date",
            "user_name",
            "email",
        ])?;
    }
    wtr.flush()?;
    Ok(count)
}

/// Export transactions to a file, CSV or JSON depending on the extension
pub fn export_transactions<'a, I>(path: &Path, transactions: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let count = match ExportFormat::from_path(path) {
        ExportFormat::Csv => write_transactions_csv(File::create(path)?, transactions)?,
        ExportFormat::Json => {
            let rows: Vec<&Transaction> = transactions.into_iter().collect();
            write_json(&rows, path)?;
            rows.len()
        }
    };

    info!("Exported {} transactions to {}", count, path.display());
    Ok(count)
}
