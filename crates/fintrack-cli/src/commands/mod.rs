//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - The all-in-one batch (report, trends, anomalies, dashboard, import, export)
//! - `core` - Core commands (init) and shared utilities (config, open_db)
//! - `import` - Import/export commands (API import, transaction export)
//! - `reports` - Report, trends, anomalies and dashboard commands

pub mod analyze;
pub mod core;
pub mod import;
pub mod reports;

// Re-export command functions for main.rs
pub use analyze::*;
pub use core::*;
pub use import::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Format an amount as dollars with thousands separators, e.g. "$1,234.50"
pub fn format_money(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
