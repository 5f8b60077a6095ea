//! Chart-ready series for the finance dashboard

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::types::{CategoryShare, DailyPoint, DashboardData, MonthlyPoint, SavingsRatePoint};
use super::{month_key, Analyzer};
use crate::models::TransactionType;

/// Savings rate goal drawn on the savings chart, in percent
pub const SAVINGS_RATE_TARGET: f64 = 20.0;

impl Analyzer {
    /// Collect every dashboard series for the (filtered) transactions
    pub fn build_dashboard(&self, user_id: Option<i64>) -> DashboardData {
        let mut monthly: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        let mut categories: BTreeMap<String, f64> = BTreeMap::new();
        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut seen_types: BTreeSet<TransactionType> = BTreeSet::new();

        for tx in self.transactions_for(user_id) {
            seen_types.insert(tx.transaction_type);
            let entry = monthly.entry(month_key(tx)).or_default();
            match tx.transaction_type {
                TransactionType::Income => entry.0 += tx.amount,
                TransactionType::Expense => {
                    entry.1 += tx.amount;
                    *categories.entry(tx.category.clone()).or_default() += tx.amount;
                    *daily.entry(tx.transaction_date.date()).or_default() += tx.amount;
                }
            }
        }

        let total_expenses: f64 = categories.values().sum();
        let expenses_by_category = categories
            .into_iter()
            .map(|(category, amount)| CategoryShare {
                percent: if total_expenses > 0.0 {
                    amount / total_expenses * 100.0
                } else {
                    0.0
                },
                category,
                amount,
            })
            .collect();

        let savings_rate = if seen_types.len() == 2 {
            monthly
                .iter()
                .map(|(month, (income, expense))| SavingsRatePoint {
                    month: month.clone(),
                    rate: if *income > 0.0 {
                        (income - expense) / income * 100.0
                    } else {
                        0.0
                    },
                })
                .collect()
        } else {
            Vec::new()
        };

        let monthly_income_vs_expenses = monthly
            .into_iter()
            .map(|(month, (income, expense))| MonthlyPoint {
                month,
                income,
                expense,
            })
            .collect();

        let daily_spending = daily
            .into_iter()
            .map(|(date, amount)| DailyPoint { date, amount })
            .collect();

        DashboardData {
            monthly_income_vs_expenses,
            expenses_by_category,
            daily_spending,
            savings_rate,
            savings_rate_target: SAVINGS_RATE_TARGET,
        }
    }
}
