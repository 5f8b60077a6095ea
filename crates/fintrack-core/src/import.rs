//! CSV import through the transactions API
//!
//! The file needs a header row with at least `description`, `amount`, `type`,
//! `category` and `date` columns. Each usable row is posted to
//! `POST {base_url}/transactions` as
//! `{"userId", "description", "amount", "type", "category"}`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::models::TransactionType;

/// Columns the import file must provide
pub const REQUIRED_COLUMNS: [&str; 5] = ["description", "amount", "type", "category", "date"];

/// A validated row ready to post
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    pub description: String,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub category: String,
    /// Not sent; the API stamps its own date. `None` when the cell didn't
    /// parse, which only logs a warning and still posts the row.
    pub date: Option<NaiveDate>,
}

/// Result of parsing an import file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedImport {
    pub rows: Vec<ImportRow>,
    /// Rows with an unparseable amount
    pub invalid: usize,
    /// Rows whose type is neither INCOME nor EXPENSE
    pub skipped: usize,
}

/// Outcome of an import run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// Rows attempted
    pub total: usize,
    pub imported: usize,
    pub failed: usize,
    pub invalid: usize,
    pub skipped: usize,
}

/// Column positions resolved from the header row
struct Columns {
    description: usize,
    amount: usize,
    transaction_type: usize,
    category: usize,
    date: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Import(format!(
                "CSV must contain columns {:?}; missing {:?}",
                REQUIRED_COLUMNS, missing
            )));
        }

        let idx = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            description: idx("description"),
            amount: idx("amount"),
            transaction_type: idx("type"),
            category: idx("category"),
            date: idx("date"),
        })
    }
}

/// Parse an import file
///
/// Missing columns fail the whole file; bad rows are counted and skipped.
pub fn parse_import_csv<R: Read>(reader: R) -> Result<ParsedImport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut parsed = ParsedImport::default();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        let field = |i: usize| record.get(i).unwrap_or("").trim();

        let Ok(transaction_type) = field(columns.transaction_type).parse::<TransactionType>()
        else {
            debug!(
                "Row {}: skipping type {:?}",
                line + 1,
                field(columns.transaction_type)
            );
            parsed.skipped += 1;
            continue;
        };

        let amount = match parse_amount(field(columns.amount)) {
            Ok(amount) => amount,
            Err(e) => {
                warn!("Row {}: {}", line + 1, e);
                parsed.invalid += 1;
                continue;
            }
        };

        let date = match parse_date(field(columns.date)) {
            Ok(date) => Some(date),
            Err(e) => {
                warn!("Row {}: {}; posting without it", line + 1, e);
                None
            }
        };

        parsed.rows.push(ImportRow {
            description: field(columns.description).to_string(),
            amount,
            transaction_type,
            category: field(columns.category).to_string(),
            date,
        });
    }

    debug!(
        "Parsed {} import rows ({} invalid, {} skipped)",
        parsed.rows.len(),
        parsed.invalid,
        parsed.skipped
    );
    Ok(parsed)
}

/// Parse a date string in various common formats
fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }

    // Timestamps keep only their date part
    if let Some((day, _)) = s.split_once([' ', 'T']) {
        if let Ok(date) = NaiveDate::parse_from_str(day, "%Y-%m-%d") {
            return Ok(date);
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount string, handling currency symbols and commas
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s.trim().replace(['$', ',', ' '], "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Import(format!("Unable to parse amount: {:?}", s)))
}

/// Request body for the create-transaction endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateTransactionRequest<'a> {
    user_id: i64,
    description: &'a str,
    amount: f64,
    #[serde(rename = "type")]
    transaction_type: TransactionType,
    category: &'a str,
}

/// HTTP client for the transactions API
#[derive(Debug, Clone)]
pub struct TransactionsApiClient {
    http_client: Client,
    base_url: String,
}

impl TransactionsApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Post one row; only HTTP 200 counts as created
    pub async fn create_transaction(&self, user_id: i64, row: &ImportRow) -> Result<()> {
        let request = CreateTransactionRequest {
            user_id,
            description: &row.description,
            amount: row.amount,
            transaction_type: row.transaction_type,
            category: &row.category,
        };

        let response = self
            .http_client
            .post(format!("{}/transactions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Import(format!(
                "API rejected {:?} with status {}",
                row.description, status
            )));
        }
        Ok(())
    }

    /// Post rows one at a time; failures are logged and counted
    pub async fn import_rows(&self, user_id: i64, rows: &[ImportRow]) -> ImportStats {
        let mut stats = ImportStats {
            total: rows.len(),
            ..Default::default()
        };

        for row in rows {
            match self.create_transaction(user_id, row).await {
                Ok(()) => stats.imported += 1,
                Err(e) => {
                    warn!("Error importing row: {}", e);
                    stats.failed += 1;
                }
            }
        }
        stats
    }
}

/// Import a CSV file for `user_id` through the API
pub async fn import_csv(
    path: &Path,
    user_id: i64,
    client: &TransactionsApiClient,
) -> Result<ImportStats> {
    let file = File::open(path)
        .map_err(|e| Error::Import(format!("Failed to open {}: {}", path.display(), e)))?;
    let parsed = parse_import_csv(file)?;

    let mut stats = client.import_rows(user_id, &parsed.rows).await;
    stats.invalid = parsed.invalid;
    stats.skipped = parsed.skipped;

    info!(
        "Successfully imported {}/{} transactions",
        stats.imported, stats.total
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("01/15/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert_eq!(
            parse_date("2024-01-15 09:30:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount(" 42 ").unwrap(), 42.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("NaN").is_err());
    }

    #[test]
    fn test_parse_import_csv() {
        let csv = "\
description,amount,type,category,date
Paycheck,2500.00,income,Salary,2024-03-01
Groceries,84.20,Expense,Food,2024-03-02
Transfer,100.00,TRANSFER,Savings,2024-03-03
Broken,lots,EXPENSE,Food,2024-03-04
Undated,12.00,EXPENSE,Food,someday
";
        let parsed = parse_import_csv(csv.as_bytes()).unwrap();

        assert_eq!(parsed.rows.len(), 3);
        assert_eq!(parsed.skipped, 1);
        assert_eq!(parsed.invalid, 1);

        let first = &parsed.rows[0];
        assert_eq!(first.description, "Paycheck");
        assert_eq!(first.amount, 2500.0);
        assert_eq!(first.transaction_type, TransactionType::Income);
        assert_eq!(first.category, "Salary");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(parsed.rows[1].transaction_type, TransactionType::Expense);

        // A bad date doesn't drop the row
        let undated = &parsed.rows[2];
        assert_eq!(undated.description, "Undated");
        assert_eq!(undated.amount, 12.0);
        assert!(undated.date.is_none());
    }

    #[test]
    fn test_parse_import_csv_column_order_and_extras() {
        let csv = "\
date,category,note,type,amount,description
2024-03-05,Food,ignored,EXPENSE,9.99,Lunch
";
        let parsed = parse_import_csv(csv.as_bytes()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].description, "Lunch");
        assert_eq!(parsed.rows[0].amount, 9.99);
    }

    #[test]
    fn test_missing_columns_fail_whole_import() {
        let csv = "description,amount,type\nLunch,9.99,EXPENSE\n";
        let err = parse_import_csv(csv.as_bytes()).unwrap_err();
        match err {
            Error::Import(msg) => {
                assert!(msg.contains("category"));
                assert!(msg.contains("date"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let request = CreateTransactionRequest {
            user_id: 7,
            description: "Lunch",
            amount: 9.99,
            transaction_type: TransactionType::Expense,
            category: "Food",
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "userId": 7,
                "description": "Lunch",
                "amount": 9.99,
                "type": "EXPENSE",
                "category": "Food"
            })
        );
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = TransactionsApiClient::new("http://localhost:8080/api/");
        assert_eq!(client.base_url(), "http://localhost:8080/api");
    }

    #[tokio::test]
    async fn test_import_against_mock_api() {
        use crate::test_utils::MockTransactionsApi;

        let server = MockTransactionsApi::start_rejecting(&["Refund"]).await;
        let client = TransactionsApiClient::new(&server.base_url());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.csv");
        std::fs::write(
            &path,
            "description,amount,type,category,date\n\
             Paycheck,2500,INCOME,Salary,2024-03-01\n\
             Refund,20,EXPENSE,Shopping,2024-03-02\n\
             Coffee,4.5,expense,Food,2024-03-02\n\
             Gift,50,OTHER,Misc,2024-03-03\n",
        )
        .unwrap();

        let stats = import_csv(&path, 42, &client).await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.imported, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.invalid, 0);

        let received = server.received();
        assert_eq!(received.len(), 3);
        assert_eq!(received[0]["userId"], 42);
        assert_eq!(received[0]["type"], "INCOME");
        assert_eq!(received[2]["description"], "Coffee");
        assert_eq!(received[2]["type"], "EXPENSE");
    }

    #[tokio::test]
    async fn test_unreachable_api_counts_failures() {
        // Nothing listens on port 9 locally
        let client = TransactionsApiClient::new("http://127.0.0.1:9/api");
        let rows = vec![ImportRow {
            description: "Lunch".into(),
            amount: 9.99,
            transaction_type: TransactionType::Expense,
            category: "Food".into(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1),
        }];

        let stats = client.import_rows(1, &rows).await;
        assert_eq!(stats.total, 1);
        assert_eq!(stats.imported, 0);
        assert_eq!(stats.failed, 1);
    }

    #[test]
    fn test_import_missing_file() {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let client = TransactionsApiClient::new("http://127.0.0.1:9/api");
        let result = rt.block_on(import_csv(Path::new("/nonexistent/import.csv"), 1, &client));
        assert!(matches!(result, Err(Error::Import(_))));
    }
}
