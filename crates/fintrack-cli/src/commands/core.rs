//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `load_config` - Resolve file and environment configuration
//! - `open_db` - Shared utility to open an existing database
//! - `load_analyzer` - Open the database and load one run's dataset
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::{Analyzer, AppConfig, Database, DatabaseConfig};

/// Load configuration from the given or default file plus the environment
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(path).context("Failed to load configuration")
}

/// Open an existing database, encrypted when a password is configured
///
/// Never creates the file or its tables; run `fintrack init` for that.
pub fn open_db(config: &DatabaseConfig) -> Result<Database> {
    let mode = if config.password.is_some() {
        "encrypted"
    } else {
        "unencrypted"
    };
    Database::open(config)
        .with_context(|| format!("Failed to open database {} ({})", config.path, mode))
}

/// Open the database and load transactions and budgets for analysis
pub fn load_analyzer(config: &DatabaseConfig, user_id: Option<i64>) -> Result<Analyzer> {
    let db = open_db(config)?;
    let dataset = db.load_dataset(user_id).context("Failed to load data")?;
    Ok(Analyzer::new(dataset))
}

pub fn cmd_init(config: &DatabaseConfig) -> Result<()> {
    println!("🔧 Initializing database at {}...", config.path);

    let db = Database::create(config)
        .with_context(|| format!("Failed to initialize database {}", config.path))?;

    if config.password.is_some() {
        println!("   🔒 Encryption: ENABLED");
    } else {
        println!("   ⚠️  Encryption: DISABLED (set DB_PASSWORD to enable)");
    }

    println!("✅ Database initialized successfully at {}", db.path());
    println!();
    println!("Next steps:");
    println!("  1. Import transactions: fintrack --user-id 1 import --file transactions.csv");
    println!("  2. Run analytics: fintrack --user-id 1 analyze --month 3");

    Ok(())
}
