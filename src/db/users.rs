//! User records, display preferences, and starter data for new accounts.

use super::{Database, now_ms};
use crate::error::CommandError;
use crate::types::User;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

fn parse_user_row(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        dark_mode: row.get("dark_mode")?,
        created_at: row.get("created_at")?,
    })
}

pub(crate) fn require_user(conn: &Connection, user_id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        params![user_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(CommandError::user_not_found(user_id).into())
    }
}

impl Database {
    /// Create a user. The password hash, if any, is produced by the caller;
    /// the core never authenticates. With `seed_starter_data` the account is
    /// populated with the default categories and sample tasks a fresh
    /// registration receives.
    pub fn create_user(
        &self,
        username: &str,
        password_hash: Option<&str>,
        seed_starter_data: bool,
    ) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(CommandError::missing_field("username").into());
        }
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let taken: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
                params![username],
                |row| row.get(0),
            )?;
            if taken {
                return Err(CommandError::already_exists("user", username).into());
            }

            tx.execute(
                "INSERT INTO users (username, password_hash, dark_mode, created_at)
                 VALUES (?1, ?2, 1, ?3)",
                params![username, password_hash, now],
            )?;
            let user_id = tx.last_insert_rowid();

            if seed_starter_data {
                seed_starter(&tx, user_id, now)?;
            }

            let user = tx.query_row(
                "SELECT * FROM users WHERE id = ?1",
                params![user_id],
                parse_user_row,
            )?;
            tx.commit()?;

            tracing::info!(user_id, username, seed_starter_data, "created user");
            Ok(user)
        })
    }

    pub fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM users WHERE id = ?1",
                params![user_id],
                parse_user_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT * FROM users WHERE username = ?1",
                params![username],
                parse_user_row,
            );
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Flip the user's dark-mode preference and return the new value.
    pub fn toggle_dark_mode(&self, user_id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET dark_mode = NOT dark_mode WHERE id = ?1",
                params![user_id],
            )?;
            if changed == 0 {
                return Err(CommandError::user_not_found(user_id).into());
            }
            let dark_mode: bool = conn.query_row(
                "SELECT dark_mode FROM users WHERE id = ?1",
                params![user_id],
                |row| row.get(0),
            )?;
            Ok(dark_mode)
        })
    }
}

/// Populate a fresh account with the default categories and sample tasks.
fn seed_starter(conn: &Connection, user_id: i64, now: i64) -> Result<()> {
    let mut category_ids = Vec::with_capacity(4);
    for (name, color) in [
        ("Work", "blue"),
        ("Personal", "green"),
        ("Health", "red"),
        ("Learning", "purple"),
    ] {
        conn.execute(
            "INSERT INTO categories (user_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, name, color, now],
        )?;
        category_ids.push(conn.last_insert_rowid());
    }
    let (work, health, learning) = (category_ids[0], category_ids[2], category_ids[3]);

    // (description, minutes, completed, priority, time_block, category, order key)
    let sample_tasks: [(&str, i64, bool, &str, &str, i64, i64); 4] = [
        ("Morning workout", 45, false, "medium", "morning", health, 1),
        ("Team meeting", 60, false, "high", "morning", work, 2),
        ("Work on Project X", 120, true, "high", "afternoon", work, 3),
        ("Read documentation", 30, false, "low", "any", learning, 4),
    ];
    let mut task_ids = Vec::with_capacity(4);
    for (description, minutes, completed, priority, time_block, category_id, order_index) in
        sample_tasks
    {
        conn.execute(
            "INSERT INTO tasks (user_id, category_id, description, estimated_minutes,
                                priority, time_block, completed, order_index, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user_id,
                category_id,
                description,
                minutes,
                priority,
                time_block,
                completed,
                order_index,
                now
            ],
        )?;
        task_ids.push(conn.last_insert_rowid());
    }

    let (meeting, project) = (task_ids[1], task_ids[2]);
    let sample_subtasks: [(i64, &str, bool, i64); 3] = [
        (meeting, "Prepare meeting agenda", false, 1),
        (meeting, "Send meeting invites", true, 2),
        (project, "Setup frontend components", true, 1),
    ];
    for (task_id, description, completed, order_index) in sample_subtasks {
        conn.execute(
            "INSERT INTO subtasks (task_id, description, completed, order_index, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![task_id, description, completed, order_index, now],
        )?;
    }

    Ok(())
}
