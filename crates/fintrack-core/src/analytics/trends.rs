//! Month-over-month trends over a trailing window

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, Local, NaiveDateTime};
use tracing::debug;

use super::stats::mean_pct_change;
use super::types::{MonthlyTotals, TrendReport};
use super::{month_key, Analyzer};
use crate::models::TransactionType;

/// Window length used when the caller doesn't pick one
pub const DEFAULT_TREND_MONTHS: u32 = 6;

/// A "month" of the trailing window, in days
const DAYS_PER_MONTH: i64 = 30;

impl Analyzer {
    /// Trends over the last `months` months, measured from now
    pub fn calculate_trends(&self, months: u32, user_id: Option<i64>) -> TrendReport {
        self.calculate_trends_at(Local::now().naive_local(), months, user_id)
    }

    /// Trends over the `months * 30` days ending at `now`
    pub fn calculate_trends_at(
        &self,
        now: NaiveDateTime,
        months: u32,
        user_id: Option<i64>,
    ) -> TrendReport {
        let start = now - Duration::days(DAYS_PER_MONTH * i64::from(months));

        let mut monthly_data: BTreeMap<String, MonthlyTotals> = BTreeMap::new();
        let mut seen_types: BTreeSet<TransactionType> = BTreeSet::new();
        let mut by_category: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();

        for tx in self
            .transactions_for(user_id)
            .filter(|tx| tx.transaction_date >= start)
        {
            let key = month_key(tx);
            let totals = monthly_data.entry(key.clone()).or_default();
            match tx.transaction_type {
                TransactionType::Income => totals.income += tx.amount,
                TransactionType::Expense => totals.expense += tx.amount,
            }
            seen_types.insert(tx.transaction_type);

            // Category series mixes both types
            *by_category
                .entry(tx.category.clone())
                .or_default()
                .entry(key)
                .or_default() += tx.amount;
        }

        let income_series: Vec<f64> = monthly_data.values().map(|t| t.income).collect();
        let expense_series: Vec<f64> = monthly_data.values().map(|t| t.expense).collect();

        let income_trend_percent = if seen_types.contains(&TransactionType::Income) {
            mean_pct_change(&income_series)
        } else {
            0.0
        };
        let expense_trend_percent = if seen_types.contains(&TransactionType::Expense) {
            mean_pct_change(&expense_series)
        } else {
            0.0
        };

        let category_trends: BTreeMap<String, f64> = by_category
            .into_iter()
            .filter(|(_, months)| months.len() > 1)
            .map(|(category, months)| {
                let series: Vec<f64> = months.into_values().collect();
                (category, mean_pct_change(&series))
            })
            .collect();

        debug!(
            "Trends since {}: {} months with data, {} category trends",
            start.date(),
            monthly_data.len(),
            category_trends.len()
        );

        TrendReport {
            period_months: months,
            income_trend_percent,
            expense_trend_percent,
            category_trends,
            monthly_data,
        }
    }
}
