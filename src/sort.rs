//! Display ordering for tasks and subtasks.
//!
//! The stored order key only says where an item sits inside its completion
//! cohort; everything else about render order is derived here. The sort is
//! stable, so items that tie all the way down keep their input order.

use crate::types::{Subtask, Task};

/// Entities without an explicit order key sort after every keyed entity in
/// their cohort.
const MISSING_ORDER_KEY: i64 = i64::MAX;

fn task_sort_key(task: &Task) -> (bool, i64, u8, u8, String) {
    (
        // Incomplete before complete; moves never cross this boundary.
        task.completed,
        task.order_index.unwrap_or(MISSING_ORDER_KEY),
        task.time_block.rank(),
        task.priority.rank(),
        task.description.to_lowercase(),
    )
}

/// Sort a user's tasks into render order: completion, manual order key,
/// time block, priority, then case-insensitive description.
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by_cached_key(task_sort_key);
}

/// Sort a task's subtasks into render order: all incomplete subtasks ordered
/// by key, then all complete subtasks ordered by key.
pub fn sort_subtasks(subtasks: &mut [Subtask]) {
    subtasks.sort_by_key(|s| (s.completed, s.order_index.unwrap_or(MISSING_ORDER_KEY)));
}
