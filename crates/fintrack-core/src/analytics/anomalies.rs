//! Expense outlier detection
//!
//! Two passes over expenses:
//! 1. Global IQR rule: above `Q3 + 1.5 * IQR` is a large expense,
//!    above `Q3 + 3 * IQR` is high severity
//! 2. Per category: above `mean + 2 * std` within a category of more than
//!    `MIN_CATEGORY_SIZE` expenses

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::stats::{mean, quantile, sample_std_dev};
use super::types::{Anomaly, AnomalyKind, AnomalySeverity};
use super::Analyzer;
use crate::models::Transaction;

/// Multiplier on the IQR for the large-expense bound
pub const IQR_MULTIPLIER: f64 = 1.5;
/// Multiplier on the IQR above which a large expense is high severity
pub const IQR_HIGH_MULTIPLIER: f64 = 3.0;
/// A category needs strictly more expenses than this to be checked
pub const MIN_CATEGORY_SIZE: usize = 5;

const CATEGORY_STD_MULTIPLIER: f64 = 2.0;

impl Analyzer {
    /// Flag unusually large expenses, largest first
    pub fn detect_anomalies(&self, user_id: Option<i64>) -> Vec<Anomaly> {
        let expenses: Vec<&Transaction> = self
            .transactions_for(user_id)
            .filter(|tx| tx.is_expense())
            .collect();

        if expenses.is_empty() {
            return Vec::new();
        }

        let mut anomalies = large_expenses(&expenses);
        let mut flagged: HashSet<i64> = anomalies.iter().map(|a| a.transaction_id).collect();

        for anomaly in category_anomalies(&expenses) {
            if flagged.insert(anomaly.transaction_id) {
                anomalies.push(anomaly);
            }
        }

        // Stable: ties keep detection order
        anomalies.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        anomalies
    }
}

fn large_expenses(expenses: &[&Transaction]) -> Vec<Anomaly> {
    let amounts: Vec<f64> = expenses.iter().map(|tx| tx.amount).collect();
    let (Some(q1), Some(q3)) = (quantile(&amounts, 0.25), quantile(&amounts, 0.75)) else {
        return Vec::new();
    };
    let iqr = q3 - q1;
    let upper_bound = q3 + IQR_MULTIPLIER * iqr;
    let high_bound = q3 + IQR_HIGH_MULTIPLIER * iqr;

    debug!(
        "IQR bounds: q1={:.2} q3={:.2} upper={:.2} high={:.2}",
        q1, q3, upper_bound, high_bound
    );

    expenses
        .iter()
        .filter(|tx| tx.amount > upper_bound)
        .map(|tx| {
            let severity = if tx.amount > high_bound {
                AnomalySeverity::High
            } else {
                AnomalySeverity::Medium
            };
            to_anomaly(tx, AnomalyKind::LargeExpense, severity, None)
        })
        .collect()
}

fn category_anomalies(expenses: &[&Transaction]) -> Vec<Anomaly> {
    // Categories in order of first appearance
    let mut order: Vec<&str> = Vec::new();
    let mut groups: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
    for &tx in expenses {
        let group = groups.entry(tx.category.as_str()).or_default();
        if group.is_empty() {
            order.push(tx.category.as_str());
        }
        group.push(tx);
    }

    let mut found = Vec::new();
    for category in order {
        let group = &groups[category];
        if group.len() <= MIN_CATEGORY_SIZE {
            continue;
        }

        let amounts: Vec<f64> = group.iter().map(|tx| tx.amount).collect();
        let (Some(avg), Some(std)) = (mean(&amounts), sample_std_dev(&amounts)) else {
            continue;
        };
        let spread = CATEGORY_STD_MULTIPLIER * std;
        let threshold = avg + spread;
        let expected_range = format!("${:.2} ± ${:.2}", avg, spread);

        debug!(
            "Category {}: mean={:.2} std={:.2} threshold={:.2}",
            category, avg, std, threshold
        );

        found.extend(group.iter().filter(|tx| tx.amount > threshold).map(|tx| {
            to_anomaly(
                tx,
                AnomalyKind::CategoryAnomaly,
                AnomalySeverity::Medium,
                Some(expected_range.clone()),
            )
        }));
    }
    found
}

fn to_anomaly(
    tx: &Transaction,
    kind: AnomalyKind,
    severity: AnomalySeverity,
    expected_range: Option<String>,
) -> Anomaly {
    Anomaly {
        kind,
        transaction_id: tx.id,
        description: tx.description.clone(),
        amount: tx.amount,
        category: tx.category.clone(),
        date: tx.transaction_date.format("%Y-%m-%d").to_string(),
        severity,
        expected_range,
    }
}
