//! Database access layer with connection pooling and schema setup
//!
//! This module is organized by domain:
//! - `transactions` - Transaction loading (joined against users)
//! - `budgets` - Budget loading (joined against users)
//!
//! Opening never creates anything: a missing file is an error and the schema
//! is left alone. Only `Database::create` (used by `fintrack init`) writes the
//! schema.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::models::Dataset;

mod budgets;
mod transactions;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the same key,
/// regardless of database path.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing encrypted databases
    const APP_SALT: &[u8; 16] = b"fintrack-salt-v1";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a stored transaction timestamp
///
/// Accepts SQLite's "YYYY-MM-DD HH:MM:SS" (optionally with fractional seconds),
/// the ISO "T" separator, and bare dates (taken as midnight).
pub(crate) fn parse_datetime(s: &str) -> std::result::Result<NaiveDateTime, chrono::ParseError> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Open an existing database described by the configuration
    ///
    /// When a password is configured the database is opened through SQLCipher
    /// with a key derived from it; otherwise it is opened in plain mode.
    pub fn open(config: &DatabaseConfig) -> Result<Self> {
        Self::new_with_key(&config.path, config.password.as_deref())
    }

    /// Create the database file if needed and initialize its schema
    pub fn create(config: &DatabaseConfig) -> Result<Self> {
        Self::create_with_key(&config.path, config.password.as_deref())
    }

    /// Open an existing unencrypted database
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Open an existing database with an explicit encryption key
    ///
    /// Fails with `Error::NotFound` if the file does not exist, and with a
    /// database error if the key can't read it.
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(Error::NotFound(path.to_string()));
        }

        let flags = OpenFlags::default().difference(OpenFlags::SQLITE_OPEN_CREATE);
        let manager = SqliteConnectionManager::file(path).with_flags(flags);
        let db = Self::connect(manager, path, passphrase)?;
        db.verify()?;

        info!("Database connection established ({})", path);
        Ok(db)
    }

    /// Create (or reuse) a database file with an explicit key and set up the schema
    pub fn create_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let db = Self::connect(SqliteConnectionManager::file(path), path, passphrase)?;
        db.init_schema()?;

        info!("Database ready ({})", path);
        Ok(db)
    }

    fn connect(
        manager: SqliteConnectionManager,
        path: &str,
        passphrase: Option<&str>,
    ) -> Result<Self> {
        // One connection: the whole run is sequential
        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(1).build(manager)?
        } else {
            Pool::builder().max_size(1).build(manager)?
        };

        Ok(Self {
            pool,
            db_path: path.to_string(),
        })
    }

    /// Read the schema catalog; fails on a wrong key or a file that isn't a database
    fn verify(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create a fresh throwaway database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "fintrack_test_{}_{}.db",
            std::process::id(),
            id
        ));
        let path = path.to_string_lossy().into_owned();

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::create_with_key(&path, None)
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Load both tables for one analysis run, optionally restricted to a user
    pub fn load_dataset(&self, user_id: Option<i64>) -> Result<Dataset> {
        let transactions = self.load_transactions(user_id)?;
        let budgets = self.load_budgets(user_id)?;

        info!(
            "Loaded {} transactions and {} budgets",
            transactions.len(),
            budgets.len()
        );

        Ok(Dataset {
            transactions,
            budgets,
        })
    }

    /// Create tables if they don't exist yet
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                type TEXT NOT NULL CHECK (type IN ('INCOME', 'EXPENSE')),
                category TEXT NOT NULL,
                transaction_date DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user ON transactions(user_id);
            CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);

            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id),
                category TEXT NOT NULL,
                amount REAL NOT NULL,
                month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
                year INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_budgets_period ON budgets(year, month);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
