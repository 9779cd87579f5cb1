//! Subtask CRUD with parent completion reconciliation.
//!
//! Every mutation here runs the triggering change first, then recomputes the
//! parent task's flag inside the same transaction, so the parent can never be
//! observed out of step with its subtasks.

use super::ordering::{self, MoveDirection, OrderScope};
use super::{Database, now_ms, tasks};
use crate::completion;
use crate::error::CommandError;
use crate::types::Subtask;
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub(crate) fn parse_subtask_row(row: &Row) -> rusqlite::Result<Subtask> {
    Ok(Subtask {
        id: row.get("id")?,
        task_id: row.get("task_id")?,
        description: row.get("description")?,
        completed: row.get("completed")?,
        order_index: row.get("order_index")?,
        created_at: row.get("created_at")?,
    })
}

/// Fetch a subtask only if its parent task belongs to the acting user.
fn get_subtask_scoped(conn: &Connection, user_id: i64, subtask_id: i64) -> Result<Option<Subtask>> {
    let result = conn.query_row(
        "SELECT s.* FROM subtasks s
         JOIN tasks t ON t.id = s.task_id
         WHERE s.id = ?1 AND t.user_id = ?2",
        params![subtask_id, user_id],
        parse_subtask_row,
    );
    match result {
        Ok(subtask) => Ok(Some(subtask)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn require_subtask(conn: &Connection, user_id: i64, subtask_id: i64) -> Result<Subtask> {
    get_subtask_scoped(conn, user_id, subtask_id)?
        .ok_or_else(|| CommandError::subtask_not_found(subtask_id).into())
}

pub(crate) fn subtasks_of(conn: &Connection, task_id: i64) -> Result<Vec<Subtask>> {
    let mut stmt = conn.prepare("SELECT * FROM subtasks WHERE task_id = ?1 ORDER BY id")?;
    let rows = stmt.query_map(params![task_id], parse_subtask_row)?;
    let mut subtasks = Vec::new();
    for subtask in rows {
        subtasks.push(subtask?);
    }
    Ok(subtasks)
}

/// Recompute the parent flag from the remaining subtasks. With none left the
/// stored flag is deliberately left untouched.
fn reconcile_parent(conn: &Connection, task_id: i64) -> Result<()> {
    let mut stmt = conn.prepare("SELECT completed FROM subtasks WHERE task_id = ?1")?;
    let flags = stmt
        .query_map(params![task_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<bool>, _>>()?;

    if let Some(flag) = completion::derived_parent_flag(&flags) {
        conn.execute(
            "UPDATE tasks SET completed = ?1 WHERE id = ?2",
            params![flag, task_id],
        )?;
    }
    Ok(())
}

impl Database {
    /// Add a subtask at the end of the task's list. A completed parent is
    /// reopened: it just gained unfinished work.
    pub fn add_subtask(&self, user_id: i64, task_id: i64, description: &str) -> Result<Subtask> {
        if description.trim().is_empty() {
            return Err(CommandError::missing_field("description").into());
        }
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = tasks::require_task(&tx, user_id, task_id)?;
            let order_index = ordering::next_order_index(&tx, OrderScope::TaskSubtasks(task_id))?;

            tx.execute(
                "INSERT INTO subtasks (task_id, description, completed, order_index, created_at)
                 VALUES (?1, ?2, 0, ?3, ?4)",
                params![task_id, description.trim(), order_index, now],
            )?;
            let subtask_id = tx.last_insert_rowid();

            if completion::reopen_on_new_subtask(task.completed) {
                tx.execute(
                    "UPDATE tasks SET completed = 0 WHERE id = ?1",
                    params![task_id],
                )?;
                tracing::debug!(task_id, subtask_id, "new subtask reopened completed task");
            }

            let subtask = require_subtask(&tx, user_id, subtask_id)?;
            tx.commit()?;
            Ok(subtask)
        })
    }

    /// All subtasks of the task, unsorted.
    pub fn subtasks_for_task(&self, user_id: i64, task_id: i64) -> Result<Vec<Subtask>> {
        self.with_conn(|conn| {
            tasks::require_task(conn, user_id, task_id)?;
            subtasks_of(conn, task_id)
        })
    }

    pub fn edit_subtask(&self, user_id: i64, subtask_id: i64, description: &str) -> Result<Subtask> {
        if description.trim().is_empty() {
            return Err(CommandError::missing_field("description").into());
        }

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_subtask(&tx, user_id, subtask_id)?;
            tx.execute(
                "UPDATE subtasks SET description = ?1 WHERE id = ?2",
                params![description.trim(), subtask_id],
            )?;
            let subtask = require_subtask(&tx, user_id, subtask_id)?;
            tx.commit()?;
            Ok(subtask)
        })
    }

    /// Flip the subtask's completion flag, then reconcile the parent.
    pub fn toggle_subtask(&self, user_id: i64, subtask_id: i64) -> Result<Subtask> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let subtask = require_subtask(&tx, user_id, subtask_id)?;

            tx.execute(
                "UPDATE subtasks SET completed = ?1 WHERE id = ?2",
                params![!subtask.completed, subtask_id],
            )?;
            reconcile_parent(&tx, subtask.task_id)?;

            let subtask = require_subtask(&tx, user_id, subtask_id)?;
            tx.commit()?;
            Ok(subtask)
        })
    }

    /// Swap the subtask one step within its completion cohort. Returns false
    /// when it is already at the cohort edge.
    pub fn move_subtask(
        &self,
        user_id: i64,
        subtask_id: i64,
        direction: MoveDirection,
    ) -> Result<bool> {
        self.with_swap_retry(|conn| {
            let tx = conn.transaction()?;
            let subtask = require_subtask(&tx, user_id, subtask_id)?;
            let moved = ordering::swap_with_neighbor(
                &tx,
                OrderScope::TaskSubtasks(subtask.task_id),
                subtask.id,
                subtask.order_index,
                subtask.completed,
                direction,
            )?;
            tx.commit()?;
            Ok(moved)
        })
    }

    /// Delete the subtask, then reconcile the parent against what remains.
    pub fn delete_subtask(&self, user_id: i64, subtask_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let subtask = require_subtask(&tx, user_id, subtask_id)?;

            tx.execute("DELETE FROM subtasks WHERE id = ?1", params![subtask_id])?;
            reconcile_parent(&tx, subtask.task_id)?;

            tx.commit()?;
            tracing::debug!(subtask_id, task_id = subtask.task_id, "deleted subtask");
            Ok(())
        })
    }
}
