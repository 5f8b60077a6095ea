//! Fintrack Core Library
//!
//! Shared functionality for the fintrack personal finance analytics tool:
//! - Database access (transactions and budgets joined with their users)
//! - Monthly reports, trends, anomaly detection and dashboard series
//! - CSV import through the transactions API
//! - JSON and CSV export
//! - Layered configuration (defaults, TOML file, environment)

pub mod analytics;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;
pub mod models;

/// Test utilities including mock transactions API
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analytics::{
    Analyzer, Anomaly, AnomalyKind, AnomalySeverity, BudgetAnalysis, BudgetStatus, DashboardData,
    MonthlyReport, MonthlyTotals, ReportSummary, TopExpense, TrendReport,
};
pub use config::{ApiConfig, AppConfig, DatabaseConfig};
pub use db::Database;
pub use error::{Error, Result};
pub use export::ExportFormat;
pub use import::{ImportRow, ImportStats, ParsedImport, TransactionsApiClient};
pub use models::{Budget, Dataset, Transaction, TransactionType};
