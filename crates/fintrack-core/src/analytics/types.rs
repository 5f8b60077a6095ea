//! Output types produced by the analytics

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Headline numbers for one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    /// Percent of income kept; 0 when there was no income
    pub savings_rate: f64,
    pub transaction_count: usize,
}

/// Whether a category stayed within its budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    OverBudget,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTrack => "on_track",
            Self::OverBudget => "over_budget",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Budget utilization for one category in the report period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAnalysis {
    pub budgeted: f64,
    pub spent: f64,
    pub remaining: f64,
    pub utilization_percent: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopExpense {
    pub description: String,
    pub amount: f64,
    pub category: String,
}

/// Monthly financial report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// "M/YYYY", e.g. "3/2024"
    pub period: String,
    pub summary: ReportSummary,
    pub expense_breakdown: BTreeMap<String, f64>,
    pub income_breakdown: BTreeMap<String, f64>,
    /// Expense totals keyed by day of month
    pub daily_spending: BTreeMap<u32, f64>,
    pub budget_analysis: BTreeMap<String, BudgetAnalysis>,
    /// Up to ten largest expenses, largest first
    pub top_expenses: Vec<TopExpense>,
}

/// Income and expense totals for one calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub income: f64,
    pub expense: f64,
}

/// Trailing-window trend analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendReport {
    pub period_months: u32,
    pub income_trend_percent: f64,
    pub expense_trend_percent: f64,
    /// Only categories seen in more than one month
    pub category_trends: BTreeMap<String, f64>,
    /// Keyed by "YYYY-MM"
    pub monthly_data: BTreeMap<String, MonthlyTotals>,
}

/// How an anomaly was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Outlier against all expenses (IQR rule)
    LargeExpense,
    /// Outlier within its own category (mean + 2 std)
    CategoryAnomaly,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LargeExpense => "large_expense",
            Self::CategoryAnomaly => "category_anomaly",
        }
    }
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    Medium,
    High,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An expense flagged as unusually large
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub transaction_id: i64,
    pub description: String,
    pub amount: f64,
    pub category: String,
    /// YYYY-MM-DD
    pub date: String,
    pub severity: AnomalySeverity,
    /// "$mean ± $2std" for category anomalies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_range: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    /// "YYYY-MM"
    pub month: String,
    pub income: f64,
    pub expense: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsRatePoint {
    pub month: String,
    pub rate: f64,
}

/// Chart-ready series for the finance dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub monthly_income_vs_expenses: Vec<MonthlyPoint>,
    pub expenses_by_category: Vec<CategoryShare>,
    pub daily_spending: Vec<DailyPoint>,
    /// Empty unless both income and expenses occur
    pub savings_rate: Vec<SavingsRatePoint>,
    pub savings_rate_target: f64,
}
