//! Database tests

use super::*;
use crate::models::*;
use crate::test_utils::{seed_budget, seed_transaction, seed_user};

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn seeded() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let alice = seed_user(&db, "Alice", "alice@example.com").unwrap();
        let bob = seed_user(&db, "Bob", "bob@example.com").unwrap();

        seed_transaction(
            &db,
            alice,
            "Paycheck",
            3000.0,
            TransactionType::Income,
            "Salary",
            "2024-03-01 09:00:00",
        )
        .unwrap();
        seed_transaction(
            &db,
            alice,
            "Groceries",
            82.75,
            TransactionType::Expense,
            "Food",
            "2024-03-02 18:30:00",
        )
        .unwrap();
        seed_transaction(
            &db,
            bob,
            "Rent",
            1200.0,
            TransactionType::Expense,
            "Housing",
            "2024-03-01",
        )
        .unwrap();

        seed_budget(&db, alice, "Food", 300.0, 3, 2024).unwrap();
        seed_budget(&db, bob, "Housing", 1200.0, 3, 2024).unwrap();

        (db, alice, bob)
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.load_transactions(None).unwrap().is_empty());
        assert!(db.load_budgets(None).unwrap().is_empty());
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('transactions') WHERE name IN ('id', 'user_id', 'description', 'amount', 'type', 'category', 'transaction_date')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 7, "transactions table should have 7 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('budgets') WHERE name IN ('id', 'user_id', 'category', 'amount', 'month', 'year')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 6, "budgets table should have 6 expected columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('users') WHERE name IN ('id', 'name', 'email')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 3);
    }

    #[test]
    fn test_type_constraint() {
        let db = Database::in_memory().unwrap();
        let user = seed_user(&db, "Alice", "alice@example.com").unwrap();
        let conn = db.conn().unwrap();

        let result = conn.execute(
            "INSERT INTO transactions (user_id, description, amount, type, category) VALUES (?, 'x', 1.0, 'TRANSFER', 'Misc')",
            params![user],
        );
        assert!(result.is_err(), "only INCOME and EXPENSE are allowed");

        let result = conn.execute(
            "INSERT INTO budgets (user_id, category, amount, month, year) VALUES (?, 'Food', 1.0, 13, 2024)",
            params![user],
        );
        assert!(result.is_err(), "month must be 1-12");
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let db = Database::in_memory().unwrap();
        seed_user(&db, "Alice", "alice@example.com").unwrap();

        // Running the schema again keeps existing rows
        db.init_schema().unwrap();
        let reopened = Database::new_unencrypted(db.path()).unwrap();
        let count: i64 = reopened
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_open_missing_file_fails_without_creating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typo.db");
        let path_str = path.to_string_lossy().into_owned();

        let result = Database::new_unencrypted(&path_str);
        assert!(matches!(result, Err(Error::NotFound(p)) if p == path_str));
        assert!(!path.exists());

        let config = crate::config::DatabaseConfig {
            path: path_str,
            password: Some("s3cret".to_string()),
        };
        assert!(Database::open(&config).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_open_does_not_write_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let path_str = path.to_string_lossy().into_owned();
        // A valid but empty SQLite file
        rusqlite::Connection::open(&path).unwrap();

        let db = Database::new_unencrypted(&path_str).unwrap();
        let tables: i64 = db
            .conn()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 0);

        // Loading reports the missing tables instead of creating them
        assert!(matches!(db.load_dataset(None), Err(Error::Database(_))));
    }

    #[test]
    fn test_create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.db");
        let config = crate::config::DatabaseConfig {
            path: path.to_string_lossy().into_owned(),
            password: None,
        };

        Database::create(&config).unwrap();
        assert!(path.exists());

        let db = Database::open(&config).unwrap();
        assert!(db.load_dataset(None).unwrap().transactions.is_empty());
    }

    #[test]
    fn test_load_transactions_joined() {
        let (db, alice, _) = seeded();

        let all = db.load_transactions(None).unwrap();
        assert_eq!(all.len(), 3);
        // id order
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let paycheck = &all[0];
        assert_eq!(paycheck.user_id, alice);
        assert_eq!(paycheck.user_name, "Alice");
        assert_eq!(paycheck.email, "alice@example.com");
        assert_eq!(paycheck.transaction_type, TransactionType::Income);
        assert_eq!(paycheck.amount, 3000.0);
        assert_eq!(
            paycheck.transaction_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
        );

        // Bare dates load as midnight
        assert_eq!(
            all[2].transaction_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_load_filtered_by_user() {
        let (db, alice, bob) = seeded();

        let alice_tx = db.load_transactions(Some(alice)).unwrap();
        assert_eq!(alice_tx.len(), 2);
        assert!(alice_tx.iter().all(|t| t.user_id == alice));

        let bob_budgets = db.load_budgets(Some(bob)).unwrap();
        assert_eq!(bob_budgets.len(), 1);
        assert_eq!(bob_budgets[0].category, "Housing");
        assert_eq!(bob_budgets[0].user_name, "Bob");
        assert_eq!(bob_budgets[0].month, 3);
        assert_eq!(bob_budgets[0].year, 2024);

        assert!(db.load_transactions(Some(999)).unwrap().is_empty());
    }

    #[test]
    fn test_load_dataset() {
        let (db, alice, _) = seeded();

        let dataset = db.load_dataset(None).unwrap();
        assert_eq!(dataset.transactions.len(), 3);
        assert_eq!(dataset.budgets.len(), 2);

        let dataset = db.load_dataset(Some(alice)).unwrap();
        assert_eq!(dataset.transactions.len(), 2);
        assert_eq!(dataset.budgets.len(), 1);
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-15 10:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-15T10:30:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-03-15 10:30:00.000").unwrap(), expected);
        assert_eq!(
            parse_datetime("2024-03-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert!(parse_datetime("15/03/2024").is_err());
    }

    #[test]
    fn test_unparseable_stored_date_fails_load() {
        let db = Database::in_memory().unwrap();
        let user = seed_user(&db, "Alice", "alice@example.com").unwrap();
        seed_transaction(
            &db,
            user,
            "Broken",
            1.0,
            TransactionType::Expense,
            "Misc",
            "not a date",
        )
        .unwrap();

        assert!(matches!(
            db.load_transactions(None),
            Err(Error::Database(_))
        ));
    }

    #[test]
    fn test_derive_key_is_deterministic() {
        let a = derive_key("correct horse").unwrap();
        let b = derive_key("correct horse").unwrap();
        let c = derive_key("battery staple").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_encrypted_database_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("secure.db");
        let path = path.to_string_lossy().into_owned();

        let db = Database::create_with_key(&path, Some("s3cret")).unwrap();
        seed_user(&db, "Alice", "alice@example.com").unwrap();
        drop(db);

        let reopened = Database::new_with_key(&path, Some("s3cret")).unwrap();
        let count: i64 = reopened
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);

        // Wrong passphrase can't read the schema catalog
        assert!(Database::new_with_key(&path, Some("wrong")).is_err());
    }
}
