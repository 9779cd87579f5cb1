//! Category CRUD. Deleting a category detaches it from tasks without
//! deleting them.

use super::{Database, now_ms, users};
use crate::error::CommandError;
use crate::types::Category;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

fn parse_category_row(row: &Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        name: row.get("name")?,
        color: row.get("color")?,
        created_at: row.get("created_at")?,
    })
}

fn require_category(conn: &Connection, user_id: i64, category_id: i64) -> Result<Category> {
    let result = conn.query_row(
        "SELECT * FROM categories WHERE id = ?1 AND user_id = ?2",
        params![category_id, user_id],
        parse_category_row,
    );
    match result {
        Ok(category) => Ok(category),
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            Err(CommandError::category_not_found(category_id).into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Category names are unique per user; `exclude` lets an edit keep its own name.
fn name_taken(conn: &Connection, user_id: i64, name: &str, exclude: Option<i64>) -> Result<bool> {
    let taken: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories
         WHERE user_id = ?1 AND name = ?2 AND id != COALESCE(?3, -1))",
        params![user_id, name, exclude],
        |row| row.get(0),
    )?;
    Ok(taken)
}

impl Database {
    pub fn create_category(
        &self,
        user_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::missing_field("name").into());
        }
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            users::require_user(&tx, user_id)?;
            if name_taken(&tx, user_id, name, None)? {
                return Err(CommandError::already_exists("category", name).into());
            }

            tx.execute(
                "INSERT INTO categories (user_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![user_id, name, color.unwrap_or("blue"), now],
            )?;
            let category_id = tx.last_insert_rowid();
            let category = require_category(&tx, user_id, category_id)?;
            tx.commit()?;

            tracing::debug!(category_id, user_id, "created category");
            Ok(category)
        })
    }

    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT * FROM categories WHERE user_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map(params![user_id], parse_category_row)?;
            let mut categories = Vec::new();
            for category in rows {
                categories.push(category?);
            }
            Ok(categories)
        })
    }

    pub fn edit_category(
        &self,
        user_id: i64,
        category_id: i64,
        name: &str,
        color: Option<&str>,
    ) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CommandError::missing_field("name").into());
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = require_category(&tx, user_id, category_id)?;
            if name_taken(&tx, user_id, name, Some(category_id))? {
                return Err(CommandError::already_exists("category", name).into());
            }

            tx.execute(
                "UPDATE categories SET name = ?1, color = ?2 WHERE id = ?3",
                params![name, color.unwrap_or(&current.color), category_id],
            )?;
            let category = require_category(&tx, user_id, category_id)?;
            tx.commit()?;
            Ok(category)
        })
    }

    /// Delete the category and clear the reference on every task that used
    /// it; the tasks themselves survive.
    pub fn delete_category(&self, user_id: i64, category_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_category(&tx, user_id, category_id)?;

            let detached = tx.execute(
                "UPDATE tasks SET category_id = NULL WHERE category_id = ?1 AND user_id = ?2",
                params![category_id, user_id],
            )?;
            tx.execute("DELETE FROM categories WHERE id = ?1", params![category_id])?;
            tx.commit()?;

            tracing::debug!(category_id, user_id, detached, "deleted category");
            Ok(())
        })
    }
}
