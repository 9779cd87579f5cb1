//! Dashboard read model: tasks in display order with their subtasks attached
//! and day-level progress counters.

use super::{Database, subtasks, tasks, users};
use crate::sort;
use crate::types::{Subtask, Task};
use anyhow::Result;

/// A task ready for rendering, with its subtasks already in display order.
#[derive(Debug, Clone)]
pub struct TaskDetail {
    pub task: Task,
    pub subtasks: Vec<Subtask>,
}

/// Everything the presentation layer needs for one user's day.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub tasks: Vec<TaskDetail>,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub percent_complete: i64,
}

impl Database {
    /// Compute the dashboard for a user, optionally filtered to one category.
    /// Progress counters are taken over the filtered set, like the rendered
    /// list itself.
    pub fn dashboard(&self, user_id: i64, category: Option<i64>) -> Result<Dashboard> {
        self.with_conn(|conn| {
            users::require_user(conn, user_id)?;

            let mut task_list = tasks::list_for_user(conn, user_id, category)?;
            let total_tasks = task_list.len();
            let completed_tasks = task_list.iter().filter(|t| t.completed).count();

            sort::sort_tasks(&mut task_list);

            let mut details = Vec::with_capacity(task_list.len());
            for task in task_list {
                let mut subs = subtasks::subtasks_of(conn, task.id)?;
                sort::sort_subtasks(&mut subs);
                details.push(TaskDetail {
                    task,
                    subtasks: subs,
                });
            }

            let percent_complete = if total_tasks > 0 {
                ((completed_tasks as f64 / total_tasks as f64) * 100.0).round() as i64
            } else {
                0
            };

            Ok(Dashboard {
                tasks: details,
                total_tasks,
                completed_tasks,
                in_progress_tasks: total_tasks - completed_tasks,
                percent_complete,
            })
        })
    }
}
