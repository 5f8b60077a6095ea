//! Transaction loading

use rusqlite::types::Type;

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{Transaction, TransactionType};

impl Database {
    /// Load all transactions joined with their owner, optionally for one user
    ///
    /// Rows come back in id order so downstream tie-breaking is stable.
    pub fn load_transactions(&self, user_id: Option<i64>) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            r#"
            SELECT t.id, t.user_id, t.description, t.amount, t.type, t.category,
                   t.transaction_date, u.name, u.email
            FROM transactions t
            JOIN users u ON t.user_id = u.id
            "#,
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(uid) = user_id {
            sql.push_str(" WHERE t.user_id = ?");
            params.push(Box::new(uid));
        }
        sql.push_str(" ORDER BY t.id");

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;

        let transactions = stmt
            .query_map(param_refs.as_slice(), |row| {
                let type_str: String = row.get(4)?;
                let transaction_type: TransactionType = type_str.parse().map_err(|e: String| {
                    rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into())
                })?;

                let date_str: String = row.get(6)?;
                let transaction_date = parse_datetime(&date_str).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e))
                })?;

                Ok(Transaction {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    description: row.get(2)?,
                    amount: row.get(3)?,
                    transaction_type,
                    category: row.get(5)?,
                    transaction_date,
                    user_name: row.get(7)?,
                    email: row.get(8)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }
}
