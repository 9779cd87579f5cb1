//! Per-scope integer order keys: append-at-end assignment and adjacent swaps
//! confined to a completion cohort.
//!
//! All swap logic lives here so atomicity and cohort filtering are enforced
//! once rather than at every call site. A swap exchanges the two key values
//! and nothing else, so the set of keys in a scope never changes through
//! moves.

use anyhow::Result;
use rusqlite::{Connection, params};

/// The set of entities among which order keys are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// All tasks belonging to one user.
    UserTasks(i64),
    /// All subtasks of one task.
    TaskSubtasks(i64),
}

impl OrderScope {
    fn table(&self) -> &'static str {
        match self {
            OrderScope::UserTasks(_) => "tasks",
            OrderScope::TaskSubtasks(_) => "subtasks",
        }
    }

    fn scope_column(&self) -> &'static str {
        match self {
            OrderScope::UserTasks(_) => "user_id",
            OrderScope::TaskSubtasks(_) => "task_id",
        }
    }

    fn scope_id(&self) -> i64 {
        match self {
            OrderScope::UserTasks(id) | OrderScope::TaskSubtasks(id) => *id,
        }
    }
}

/// Direction of an adjacent move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Next append-at-end key for the scope: one past the highest existing key,
/// or 1 when the scope is empty.
pub fn next_order_index(conn: &Connection, scope: OrderScope) -> Result<i64> {
    let sql = format!(
        "SELECT COALESCE(MAX(order_index), 0) + 1 FROM {} WHERE {} = ?1",
        scope.table(),
        scope.scope_column()
    );
    let next = conn.query_row(&sql, params![scope.scope_id()], |row| row.get(0))?;
    Ok(next)
}

/// Swap the entity's order key with its nearest neighbor in the given
/// direction, within the same scope and the same completion cohort.
///
/// Returns `false` without touching any key when the entity is already at
/// the edge of its cohort, or when it has no order key at all. Must run
/// inside an open transaction so a half-applied swap can never persist.
pub fn swap_with_neighbor(
    conn: &Connection,
    scope: OrderScope,
    entity_id: i64,
    order_index: Option<i64>,
    completed: bool,
    direction: MoveDirection,
) -> Result<bool> {
    let Some(order_index) = order_index else {
        return Ok(false);
    };

    // Duplicate keys are not excluded by the store; resolving the neighbor
    // by row id as well keeps repeated calls deterministic.
    let (cmp, dir) = match direction {
        MoveDirection::Up => ("<", "DESC"),
        MoveDirection::Down => (">", "ASC"),
    };
    let sql = format!(
        "SELECT id, order_index FROM {table}
         WHERE {col} = ?1 AND completed = ?2 AND order_index {cmp} ?3
         ORDER BY order_index {dir}, id {dir} LIMIT 1",
        table = scope.table(),
        col = scope.scope_column(),
    );

    let neighbor = conn.query_row(&sql, params![scope.scope_id(), completed, order_index], |row| {
        Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?))
    });
    let (neighbor_id, neighbor_index) = match neighbor {
        Ok(pair) => pair,
        Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(false),
        Err(e) => return Err(e.into()),
    };

    let update = format!("UPDATE {} SET order_index = ?1 WHERE id = ?2", scope.table());
    conn.execute(&update, params![neighbor_index, entity_id])?;
    conn.execute(&update, params![order_index, neighbor_id])?;

    tracing::debug!(
        table = scope.table(),
        entity_id,
        neighbor_id,
        ?direction,
        "swapped order keys"
    );

    Ok(true)
}
