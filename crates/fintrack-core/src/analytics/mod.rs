//! Analytics over a loaded dataset
//!
//! - `report` - Monthly report with budget utilization
//! - `trends` - Trailing-window month-over-month trends
//! - `anomalies` - IQR and per-category outlier detection
//! - `dashboard` - Chart-ready series for visualization
//!
//! Every operation takes an optional user id; when set, only that user's
//! rows are considered.

use crate::models::{Budget, Dataset, Transaction};

mod anomalies;
mod dashboard;
mod report;
pub mod stats;
mod trends;
pub mod types;

pub use anomalies::{IQR_HIGH_MULTIPLIER, IQR_MULTIPLIER, MIN_CATEGORY_SIZE};
pub use dashboard::SAVINGS_RATE_TARGET;
pub use trends::DEFAULT_TREND_MONTHS;
pub use types::*;

/// Runs analytics over one invocation's dataset
///
/// Holds the data by value; analysis never mutates it.
#[derive(Debug, Clone)]
pub struct Analyzer {
    dataset: Dataset,
}

impl Analyzer {
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Transactions visible for the given user filter
    pub fn transactions_for(&self, user_id: Option<i64>) -> impl Iterator<Item = &Transaction> {
        self.dataset
            .transactions
            .iter()
            .filter(move |tx| user_id.is_none_or(|uid| tx.user_id == uid))
    }

    /// Budgets visible for the given user filter
    pub fn budgets_for(&self, user_id: Option<i64>) -> impl Iterator<Item = &Budget> {
        self.dataset
            .budgets
            .iter()
            .filter(move |b| user_id.is_none_or(|uid| b.user_id == uid))
    }
}

impl From<Dataset> for Analyzer {
    fn from(dataset: Dataset) -> Self {
        Self::new(dataset)
    }
}

/// Calendar month key used for grouping, e.g. "2024-03"
pub(crate) fn month_key(tx: &Transaction) -> String {
    tx.transaction_date.format("%Y-%m").to_string()
}
