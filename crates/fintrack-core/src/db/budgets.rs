//! Budget loading

use super::Database;
use crate::error::Result;
use crate::models::Budget;

impl Database {
    /// Load all budgets joined with their owner, optionally for one user
    pub fn load_budgets(&self, user_id: Option<i64>) -> Result<Vec<Budget>> {
        let conn = self.conn()?;

        let mut sql = String::from(
            r#"
            SELECT b.id, b.user_id, b.category, b.amount, b.month, b.year, u.name, u.email
            FROM budgets b
            JOIN users u ON b.user_id = u.id
            "#,
        );
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(uid) = user_id {
            sql.push_str(" WHERE b.user_id = ?");
            params.push(Box::new(uid));
        }
        sql.push_str(" ORDER BY b.id");

        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;

        let budgets = stmt
            .query_map(param_refs.as_slice(), |row| {
                Ok(Budget {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    category: row.get(2)?,
                    amount: row.get(3)?,
                    month: row.get(4)?,
                    year: row.get(5)?,
                    user_name: row.get(6)?,
                    email: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(budgets)
    }
}
