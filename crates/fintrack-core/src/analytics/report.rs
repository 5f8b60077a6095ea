//! Monthly report generation

use std::collections::BTreeMap;

use chrono::Datelike;
use tracing::{debug, warn};

use super::types::{BudgetAnalysis, BudgetStatus, MonthlyReport, ReportSummary, TopExpense};
use super::Analyzer;
use crate::models::Transaction;

/// How many expenses the report lists
const TOP_EXPENSES: usize = 10;

impl Analyzer {
    /// Build the report for one calendar month
    ///
    /// Returns `None` when nothing was recorded in that month.
    pub fn generate_monthly_report(
        &self,
        year: i32,
        month: u32,
        user_id: Option<i64>,
    ) -> Option<MonthlyReport> {
        let rows: Vec<&Transaction> = self
            .transactions_for(user_id)
            .filter(|tx| {
                tx.transaction_date.year() == year && tx.transaction_date.month() == month
            })
            .collect();

        if rows.is_empty() {
            warn!("No transactions found for {}/{}", month, year);
            return None;
        }

        let mut total_income = 0.0;
        let mut total_expenses = 0.0;
        let mut expense_breakdown: BTreeMap<String, f64> = BTreeMap::new();
        let mut income_breakdown: BTreeMap<String, f64> = BTreeMap::new();
        let mut daily_spending: BTreeMap<u32, f64> = BTreeMap::new();

        for tx in &rows {
            if tx.is_income() {
                total_income += tx.amount;
                *income_breakdown.entry(tx.category.clone()).or_default() += tx.amount;
            } else {
                total_expenses += tx.amount;
                *expense_breakdown.entry(tx.category.clone()).or_default() += tx.amount;
                *daily_spending.entry(tx.transaction_date.day()).or_default() += tx.amount;
            }
        }

        let net_savings = total_income - total_expenses;
        let savings_rate = if total_income > 0.0 {
            net_savings / total_income * 100.0
        } else {
            0.0
        };

        // Budgets sharing a category (several users, no filter) are pooled
        let mut budgeted_by_category: BTreeMap<String, f64> = BTreeMap::new();
        for budget in self
            .budgets_for(user_id)
            .filter(|b| b.year == year && b.month == month)
        {
            *budgeted_by_category
                .entry(budget.category.clone())
                .or_default() += budget.amount;
        }

        let budget_analysis = budgeted_by_category
            .into_iter()
            .map(|(category, budgeted)| {
                let spent = expense_breakdown.get(&category).copied().unwrap_or(0.0);
                let analysis = analyze_budget(budgeted, spent);
                (category, analysis)
            })
            .collect();

        let mut expenses: Vec<&Transaction> =
            rows.iter().copied().filter(|tx| tx.is_expense()).collect();
        // Stable sort keeps load order among equal amounts
        expenses.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        let top_expenses = expenses
            .into_iter()
            .take(TOP_EXPENSES)
            .map(|tx| TopExpense {
                description: tx.description.clone(),
                amount: tx.amount,
                category: tx.category.clone(),
            })
            .collect();

        debug!(
            "Report {}/{}: income {:.2}, expenses {:.2} over {} transactions",
            month,
            year,
            total_income,
            total_expenses,
            rows.len()
        );

        Some(MonthlyReport {
            period: format!("{}/{}", month, year),
            summary: ReportSummary {
                total_income,
                total_expenses,
                net_savings,
                savings_rate,
                transaction_count: rows.len(),
            },
            expense_breakdown,
            income_breakdown,
            daily_spending,
            budget_analysis,
            top_expenses,
        })
    }
}

fn analyze_budget(budgeted: f64, spent: f64) -> BudgetAnalysis {
    BudgetAnalysis {
        budgeted,
        spent,
        remaining: budgeted - spent,
        utilization_percent: if budgeted > 0.0 {
            spent / budgeted * 100.0
        } else {
            0.0
        },
        status: if spent > budgeted {
            BudgetStatus::OverBudget
        } else {
            BudgetStatus::OnTrack
        },
    }
}
