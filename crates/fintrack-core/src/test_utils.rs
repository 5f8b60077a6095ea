//! Test utilities for fintrack-core
//!
//! This module provides testing infrastructure including a mock transactions
//! API for import tests and helpers for seeding a database.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::NaiveDate;
use rusqlite::params;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, Transaction, TransactionType};

#[derive(Default)]
struct MockState {
    received: Mutex<Vec<Value>>,
    /// Descriptions answered with 422 instead of 200
    reject: HashSet<String>,
}

/// Mock transactions API for testing imports
///
/// Serves `POST /api/transactions`, records every JSON body it receives and
/// answers 200 unless the description is on the reject list.
pub struct MockTransactionsApi {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockTransactionsApi {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_rejecting(&[]).await
    }

    /// Start a server that refuses rows with the given descriptions
    pub async fn start_rejecting(descriptions: &[&str]) -> Self {
        let state = Arc::new(MockState {
            received: Mutex::new(Vec::new()),
            reject: descriptions.iter().map(|d| d.to_string()).collect(),
        });

        let app = Router::new()
            .route("/api/transactions", post(handle_create))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Root URL of this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// API base URL, i.e. what `FINTRACK_API_URL` would hold
    pub fn base_url(&self) -> String {
        format!("{}/api", self.url())
    }

    /// Bodies received so far, in arrival order
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockTransactionsApi {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn handle_create(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let description = body["description"].as_str().unwrap_or_default().to_string();
    state.received.lock().unwrap().push(body.clone());

    if state.reject.contains(&description) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({ "error": "rejected" })),
        );
    }

    let id = state.received.lock().unwrap().len();
    let mut created = body;
    created["id"] = Value::from(id);
    (StatusCode::OK, Json(created))
}

/// Build an in-memory transaction for unit tests
///
/// `date` is "YYYY-MM-DD"; the description mirrors the category.
pub fn make_transaction(
    id: i64,
    user_id: i64,
    transaction_type: TransactionType,
    amount: f64,
    category: &str,
    date: &str,
) -> Transaction {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("test date must be YYYY-MM-DD");
    Transaction {
        id,
        user_id,
        description: category.to_string(),
        amount,
        transaction_type,
        category: category.to_string(),
        transaction_date: day.and_hms_opt(0, 0, 0).expect("midnight is valid"),
        user_name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    }
}

/// Build an in-memory budget for unit tests
pub fn make_budget(
    id: i64,
    user_id: i64,
    category: &str,
    amount: f64,
    month: u32,
    year: i32,
) -> Budget {
    Budget {
        id,
        user_id,
        category: category.to_string(),
        amount,
        month,
        year,
        user_name: "Test User".to_string(),
        email: "test@example.com".to_string(),
    }
}

/// Insert a user row, returning its id
pub fn seed_user(db: &Database, name: &str, email: &str) -> Result<i64> {
    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO users (name, email) VALUES (?, ?)",
        params![name, email],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a transaction row, returning its id
///
/// `timestamp` is stored as given, e.g. "2024-03-15 10:00:00".
pub fn seed_transaction(
    db: &Database,
    user_id: i64,
    description: &str,
    amount: f64,
    transaction_type: TransactionType,
    category: &str,
    timestamp: &str,
) -> Result<i64> {
    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO transactions (user_id, description, amount, type, category, transaction_date)
         VALUES (?, ?, ?, ?, ?, ?)",
        params![
            user_id,
            description,
            amount,
            transaction_type.as_str(),
            category,
            timestamp
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Insert a budget row, returning its id
pub fn seed_budget(
    db: &Database,
    user_id: i64,
    category: &str,
    amount: f64,
    month: u32,
    year: i32,
) -> Result<i64> {
    let conn = db.conn()?;
    conn.execute(
        "INSERT INTO budgets (user_id, category, amount, month, year) VALUES (?, ?, ?, ?, ?)",
        params![user_id, category, amount, month, year],
    )?;
    Ok(conn.last_insert_rowid())
}
