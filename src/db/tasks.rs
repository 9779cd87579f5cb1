//! Task CRUD, completion toggling, and manual reordering.

use super::ordering::{self, MoveDirection, OrderScope};
use super::{Database, now_ms, users};
use crate::completion;
use crate::error::CommandError;
use crate::types::{Priority, Task, TimeBlock};
use anyhow::Result;
use rusqlite::{Connection, Row, params};

pub(crate) fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    let priority: String = row.get("priority")?;
    let time_block: String = row.get("time_block")?;
    Ok(Task {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        category_id: row.get("category_id")?,
        description: row.get("description")?,
        estimated_minutes: row.get("estimated_minutes")?,
        priority: Priority::parse(&priority).unwrap_or_default(),
        time_block: TimeBlock::parse(&time_block).unwrap_or_default(),
        completed: row.get("completed")?,
        order_index: row.get("order_index")?,
        created_at: row.get("created_at")?,
    })
}

/// Fetch a task only if the acting user owns it.
pub(crate) fn get_task_scoped(
    conn: &Connection,
    user_id: i64,
    task_id: i64,
) -> Result<Option<Task>> {
    let result = conn.query_row(
        "SELECT * FROM tasks WHERE id = ?1 AND user_id = ?2",
        params![task_id, user_id],
        parse_task_row,
    );
    match result {
        Ok(task) => Ok(Some(task)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn require_task(conn: &Connection, user_id: i64, task_id: i64) -> Result<Task> {
    get_task_scoped(conn, user_id, task_id)?
        .ok_or_else(|| CommandError::task_not_found(task_id).into())
}

pub(crate) fn list_for_user(
    conn: &Connection,
    user_id: i64,
    category: Option<i64>,
) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();
    match category {
        Some(category_id) => {
            let mut stmt = conn.prepare(
                "SELECT * FROM tasks WHERE user_id = ?1 AND category_id = ?2 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![user_id, category_id], parse_task_row)?;
            for task in rows {
                tasks.push(task?);
            }
        }
        None => {
            let mut stmt = conn.prepare("SELECT * FROM tasks WHERE user_id = ?1 ORDER BY id")?;
            let rows = stmt.query_map(params![user_id], parse_task_row)?;
            for task in rows {
                tasks.push(task?);
            }
        }
    }
    Ok(tasks)
}

fn validate_task_fields(description: &str, estimated_minutes: i64) -> Result<()> {
    if description.trim().is_empty() {
        return Err(CommandError::missing_field("description").into());
    }
    if estimated_minutes <= 0 {
        return Err(CommandError::invalid_value(
            "estimated_minutes",
            "estimated time must be a positive number of minutes",
        )
        .into());
    }
    Ok(())
}

/// Resolve a requested category to one the acting user owns. References to
/// missing or foreign categories are dropped rather than rejected.
fn resolve_category(
    conn: &Connection,
    user_id: i64,
    category_id: Option<i64>,
) -> Result<Option<i64>> {
    let Some(id) = category_id else {
        return Ok(None);
    };
    let owned: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1 AND user_id = ?2)",
        params![id, user_id],
        |row| row.get(0),
    )?;
    if owned {
        Ok(Some(id))
    } else {
        tracing::debug!(category_id = id, user_id, "dropping category reference not owned by user");
        Ok(None)
    }
}

impl Database {
    /// Create a task at the end of the user's list.
    pub fn create_task(
        &self,
        user_id: i64,
        description: &str,
        estimated_minutes: i64,
        priority: Priority,
        time_block: TimeBlock,
        category_id: Option<i64>,
    ) -> Result<Task> {
        validate_task_fields(description, estimated_minutes)?;
        let now = now_ms();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            users::require_user(&tx, user_id)?;
            let category_id = resolve_category(&tx, user_id, category_id)?;
            let order_index = ordering::next_order_index(&tx, OrderScope::UserTasks(user_id))?;

            tx.execute(
                "INSERT INTO tasks (user_id, category_id, description, estimated_minutes,
                                    priority, time_block, completed, order_index, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8)",
                params![
                    user_id,
                    category_id,
                    description.trim(),
                    estimated_minutes,
                    priority.as_str(),
                    time_block.as_str(),
                    order_index,
                    now
                ],
            )?;
            let task_id = tx.last_insert_rowid();
            let task = require_task(&tx, user_id, task_id)?;
            tx.commit()?;

            tracing::debug!(task_id, user_id, order_index, "created task");
            Ok(task)
        })
    }

    pub fn get_task(&self, user_id: i64, task_id: i64) -> Result<Task> {
        self.with_conn(|conn| require_task(conn, user_id, task_id))
    }

    /// All tasks of the user, unsorted, optionally restricted to a category.
    pub fn list_tasks(&self, user_id: i64, category: Option<i64>) -> Result<Vec<Task>> {
        self.with_conn(|conn| list_for_user(conn, user_id, category))
    }

    /// Replace every editable field of the task. Completion flag and order
    /// key are left stable through edits.
    pub fn edit_task(
        &self,
        user_id: i64,
        task_id: i64,
        description: &str,
        estimated_minutes: i64,
        priority: Priority,
        time_block: TimeBlock,
        category_id: Option<i64>,
    ) -> Result<Task> {
        validate_task_fields(description, estimated_minutes)?;

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_task(&tx, user_id, task_id)?;
            let category_id = resolve_category(&tx, user_id, category_id)?;

            tx.execute(
                "UPDATE tasks SET description = ?1, estimated_minutes = ?2, priority = ?3,
                                  time_block = ?4, category_id = ?5
                 WHERE id = ?6",
                params![
                    description.trim(),
                    estimated_minutes,
                    priority.as_str(),
                    time_block.as_str(),
                    category_id,
                    task_id
                ],
            )?;
            let task = require_task(&tx, user_id, task_id)?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Flip the task's completion flag. Completing a task with subtasks
    /// completes all of them; un-completing never touches them.
    pub fn toggle_task(&self, user_id: i64, task_id: i64) -> Result<Task> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, user_id, task_id)?;
            let now_completed = !task.completed;

            tx.execute(
                "UPDATE tasks SET completed = ?1 WHERE id = ?2",
                params![now_completed, task_id],
            )?;

            let subtask_count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM subtasks WHERE task_id = ?1",
                params![task_id],
                |row| row.get(0),
            )?;
            if completion::cascade_to_subtasks(now_completed, subtask_count > 0) {
                tx.execute(
                    "UPDATE subtasks SET completed = 1 WHERE task_id = ?1",
                    params![task_id],
                )?;
                tracing::debug!(task_id, subtask_count, "task completed, cascading to subtasks");
            }

            let task = require_task(&tx, user_id, task_id)?;
            tx.commit()?;
            Ok(task)
        })
    }

    /// Delete the task and, through the schema cascade, all its subtasks.
    pub fn delete_task(&self, user_id: i64, task_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            require_task(&tx, user_id, task_id)?;
            tx.execute("DELETE FROM tasks WHERE id = ?1", params![task_id])?;
            tx.commit()?;
            tracing::debug!(task_id, user_id, "deleted task");
            Ok(())
        })
    }

    /// Swap the task one step up or down within its completion cohort.
    /// Returns false when the task is already at the cohort edge.
    pub fn move_task(&self, user_id: i64, task_id: i64, direction: MoveDirection) -> Result<bool> {
        self.with_swap_retry(|conn| {
            let tx = conn.transaction()?;
            let task = require_task(&tx, user_id, task_id)?;
            let moved = ordering::swap_with_neighbor(
                &tx,
                OrderScope::UserTasks(user_id),
                task.id,
                task.order_index,
                task.completed,
                direction,
            )?;
            tx.commit()?;
            Ok(moved)
        })
    }

    /// Clear completion on every task and subtask the user owns.
    pub fn reset_all_tasks(&self, user_id: i64) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            users::require_user(&tx, user_id)?;
            tx.execute(
                "UPDATE subtasks SET completed = 0
                 WHERE task_id IN (SELECT id FROM tasks WHERE user_id = ?1)",
                params![user_id],
            )?;
            let reset = tx.execute(
                "UPDATE tasks SET completed = 0 WHERE user_id = ?1",
                params![user_id],
            )?;
            tx.commit()?;
            tracing::info!(user_id, tasks_reset = reset, "reset all tasks");
            Ok(())
        })
    }
}
