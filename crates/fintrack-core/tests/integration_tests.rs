//! Integration tests for fintrack-core
//!
//! These tests exercise the full load → analyze → export workflow.

use std::fs;

use chrono::NaiveDate;
use fintrack_core::{
    analytics::{AnomalyKind, AnomalySeverity, BudgetStatus},
    db::Database,
    export::{export_transactions, write_dashboard, write_monthly_report},
    import::{import_csv, TransactionsApiClient},
    test_utils::{seed_budget, seed_transaction, seed_user, MockTransactionsApi},
    Analyzer, MonthlyReport, TransactionType,
};

/// Two users; Alice has three months of history with one outsized purchase
fn seeded_db() -> (Database, i64, i64) {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let alice = seed_user(&db, "Alice", "alice@example.com").unwrap();
    let bob = seed_user(&db, "Bob", "bob@example.com").unwrap();

    for (month, salary, groceries) in [(1, 4000.0, 300.0), (2, 4000.0, 330.0), (3, 4400.0, 360.0)] {
        let day = |d: u32| format!("2024-{:02}-{:02} 12:00:00", month, d);
        seed_transaction(&db, alice, "Paycheck", salary, TransactionType::Income, "Salary", &day(1)).unwrap();
        seed_transaction(&db, alice, "Rent", 1500.0, TransactionType::Expense, "Housing", &day(2)).unwrap();
        seed_transaction(&db, alice, "Groceries", groceries, TransactionType::Expense, "Food", &day(10)).unwrap();
        seed_transaction(&db, alice, "Coffee", 20.0, TransactionType::Expense, "Dining", &day(12)).unwrap();
        seed_transaction(&db, alice, "Lunch", 25.0, TransactionType::Expense, "Dining", &day(18)).unwrap();
    }
    seed_transaction(&db, alice, "New laptop", 9000.0, TransactionType::Expense, "Electronics", "2024-03-20 15:00:00").unwrap();

    seed_budget(&db, alice, "Food", 350.0, 3, 2024).unwrap();
    seed_budget(&db, alice, "Housing", 1500.0, 3, 2024).unwrap();

    seed_transaction(&db, bob, "Paycheck", 2000.0, TransactionType::Income, "Salary", "2024-03-01 12:00:00").unwrap();
    seed_transaction(&db, bob, "Rent", 900.0, TransactionType::Expense, "Housing", "2024-03-03 12:00:00").unwrap();

    (db, alice, bob)
}

// =============================================================================
// Analysis Workflow Tests
// =============================================================================

#[test]
fn test_monthly_report_from_database() {
    let (db, alice, _) = seeded_db();
    let analyzer = Analyzer::new(db.load_dataset(Some(alice)).unwrap());

    let report = analyzer
        .generate_monthly_report(2024, 3, Some(alice))
        .expect("March has transactions");

    assert_eq!(report.period, "3/2024");
    assert_eq!(report.summary.total_income, 4400.0);
    assert_eq!(report.summary.total_expenses, 1500.0 + 360.0 + 45.0 + 9000.0);
    assert_eq!(report.summary.transaction_count, 6);
    assert!(report.summary.savings_rate < 0.0);

    let food = &report.budget_analysis["Food"];
    assert_eq!(food.status, BudgetStatus::OverBudget);
    assert_eq!(food.remaining, -10.0);
    assert_eq!(report.budget_analysis["Housing"].status, BudgetStatus::OnTrack);

    assert_eq!(report.top_expenses[0].description, "New laptop");
}

#[test]
fn test_user_filter_isolates_users() {
    let (db, _, bob) = seeded_db();
    let analyzer = Analyzer::new(db.load_dataset(None).unwrap());

    let report = analyzer.generate_monthly_report(2024, 3, Some(bob)).unwrap();
    assert_eq!(report.summary.total_income, 2000.0);
    assert_eq!(report.summary.total_expenses, 900.0);
    assert!(report.budget_analysis.is_empty());
}

#[test]
fn test_trends_from_database() {
    let (db, alice, _) = seeded_db();
    let analyzer = Analyzer::new(db.load_dataset(Some(alice)).unwrap());

    let now = NaiveDate::from_ymd_opt(2024, 3, 31)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let trends = analyzer.calculate_trends_at(now, 6, Some(alice));

    assert_eq!(trends.monthly_data.len(), 3);
    // 0% then +10%
    assert!((trends.income_trend_percent - 5.0).abs() < 1e-9);
    // Groceries grow 10% a month
    assert!(trends.category_trends["Food"] > 9.0);
    assert_eq!(trends.category_trends["Housing"], 0.0);
    assert!(!trends.category_trends.contains_key("Electronics"));
}

#[test]
fn test_anomalies_from_database() {
    let (db, alice, _) = seeded_db();
    let analyzer = Analyzer::new(db.load_dataset(None).unwrap());

    let anomalies = analyzer.detect_anomalies(Some(alice));
    assert!(!anomalies.is_empty());

    let laptop = &anomalies[0];
    assert_eq!(laptop.description, "New laptop");
    assert_eq!(laptop.kind, AnomalyKind::LargeExpense);
    assert_eq!(laptop.severity, AnomalySeverity::High);
    assert_eq!(laptop.date, "2024-03-20");

    // Every flagged row is an expense of this user
    let expenses = db.load_transactions(Some(alice)).unwrap();
    for anomaly in &anomalies {
        let tx = expenses
            .iter()
            .find(|t| t.id == anomaly.transaction_id)
            .unwrap();
        assert_eq!(tx.transaction_type, TransactionType::Expense);
    }
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_full_export_workflow() {
    let (db, alice, _) = seeded_db();
    let analyzer = Analyzer::new(db.load_dataset(Some(alice)).unwrap());
    let out = tempfile::tempdir().unwrap();

    let report = analyzer.generate_monthly_report(2024, 3, Some(alice)).unwrap();
    let report_path = write_monthly_report(&report, out.path(), 3, 2024).unwrap();
    assert_eq!(report_path, out.path().join("monthly_report_3_2024.json"));
    let reloaded: MonthlyReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(reloaded, report);

    let dashboard_path = write_dashboard(&analyzer.build_dashboard(Some(alice)), out.path()).unwrap();
    assert!(dashboard_path.exists());

    let csv_path = out.path().join("transactions.csv");
    let count = export_transactions(&csv_path, analyzer.transactions_for(Some(alice))).unwrap();
    assert_eq!(count, 16);

    let csv = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(csv.lines().count(), 17);
    assert!(csv.contains("Alice,alice@example.com"));
    assert!(!csv.contains("bob@example.com"));
}

// =============================================================================
// Import Tests
// =============================================================================

#[tokio::test]
async fn test_csv_import_posts_rows() {
    let server = MockTransactionsApi::start().await;
    let client = TransactionsApiClient::new(&server.base_url());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("import.csv");
    fs::write(
        &path,
        "description,amount,type,category,date\n\
         Paycheck,4000,INCOME,Salary,2024-04-01\n\
         Rent,1500,EXPENSE,Housing,2024-04-02\n\
         Typo,abc,EXPENSE,Housing,2024-04-02\n\
         Gift,50,INCOME,Other,sometime in April\n",
    )
    .unwrap();

    let stats = import_csv(&path, 1, &client).await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.imported, 3);
    assert_eq!(stats.invalid, 1);

    let received = server.received();
    assert_eq!(received.len(), 3);
    assert_eq!(received[2]["description"], "Gift");
    assert_eq!(received[1]["category"], "Housing");
    assert_eq!(received[1]["amount"], 1500.0);
    assert!(received[1].get("date").is_none());
}
