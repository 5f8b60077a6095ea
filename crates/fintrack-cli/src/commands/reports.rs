//! Report command implementations

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::analytics::{
    Analyzer, BudgetAnalysis, BudgetStatus, MonthlyReport, TrendReport,
};
use fintrack_core::export::{write_dashboard, write_monthly_report};

use super::{format_money, truncate};

/// Print the headline numbers of a monthly report
pub fn print_report_summary(report: &MonthlyReport) {
    let s = &report.summary;
    println!();
    println!("📊 Monthly Report for {}", report.period);
    println!("   ─────────────────────────────");
    println!("   Total Income:   {}", format_money(s.total_income));
    println!("   Total Expenses: {}", format_money(s.total_expenses));
    println!("   Net Savings:    {}", format_money(s.net_savings));
    println!("   Savings Rate:   {:.1}%", s.savings_rate);

    let over = over_budget(report);
    if !over.is_empty() {
        println!();
        for (category, b) in over {
            println!(
                "   🔴 {} over budget: {} of {} ({:.0}%)",
                category,
                format_money(b.spent),
                format_money(b.budgeted),
                b.utilization_percent
            );
        }
    }
}

/// Categories the report marked over budget
pub fn over_budget(report: &MonthlyReport) -> Vec<(&str, &BudgetAnalysis)> {
    report
        .budget_analysis
        .iter()
        .filter(|(_, b)| b.status == BudgetStatus::OverBudget)
        .map(|(category, b)| (category.as_str(), b))
        .collect()
}

/// Print trend percentages
pub fn print_trends(trends: &TrendReport) {
    println!();
    println!("📈 {}-Month Trends:", trends.period_months);
    println!("   Income Trend:  {:+.1}%", trends.income_trend_percent);
    println!("   Expense Trend: {:+.1}%", trends.expense_trend_percent);

    for (category, change) in &trends.category_trends {
        println!("   {:<24} {:+.1}%", truncate(category, 24), change);
    }
}

/// Generate the report for one month and write it as JSON
pub fn cmd_report(
    analyzer: &Analyzer,
    year: i32,
    month: u32,
    user_id: Option<i64>,
    output_dir: &Path,
) -> Result<()> {
    let Some(report) = analyzer.generate_monthly_report(year, month, user_id) else {
        println!("No transactions found for {}/{}", month, year);
        return Ok(());
    };

    print_report_summary(&report);

    let path = write_monthly_report(&report, output_dir, month, year)
        .context("Failed to export monthly report")?;
    println!();
    println!("✅ Report exported to {}", path.display());

    Ok(())
}

pub fn cmd_trends(analyzer: &Analyzer, months: u32, user_id: Option<i64>) -> Result<()> {
    let trends = analyzer.calculate_trends(months, user_id);

    if trends.monthly_data.is_empty() {
        println!("No transactions in the last {} months.", months);
        return Ok(());
    }

    print_trends(&trends);
    Ok(())
}

pub fn cmd_anomalies(analyzer: &Analyzer, user_id: Option<i64>, limit: usize) -> Result<()> {
    let anomalies = analyzer.detect_anomalies(user_id);

    if anomalies.is_empty() {
        println!("✅ No spending anomalies detected.");
        return Ok(());
    }

    println!();
    println!("⚠️  Detected {} spending anomalies:", anomalies.len());
    for anomaly in anomalies.iter().take(limit) {
        println!(
            "  • {}: {} ({}) {} [{}, {}]",
            truncate(&anomaly.description, 40),
            format_money(anomaly.amount),
            anomaly.category,
            anomaly.date,
            anomaly.kind,
            anomaly.severity
        );
        if let Some(range) = &anomaly.expected_range {
            println!("      expected {}", range);
        }
    }
    if anomalies.len() > limit {
        println!("  ... and {} more", anomalies.len() - limit);
    }

    Ok(())
}

pub fn cmd_dashboard(analyzer: &Analyzer, user_id: Option<i64>, output_dir: &Path) -> Result<()> {
    let data = analyzer.build_dashboard(user_id);
    let path = write_dashboard(&data, output_dir).context("Failed to write dashboard data")?;

    println!("✅ Visualizations saved to {}", path.display());
    Ok(())
}
