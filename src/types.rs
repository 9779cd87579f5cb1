//! Core types for the daywise task engine.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    /// Display rank: high renders before medium renders before low.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// Part of the day a task is planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeBlock {
    Morning,
    Afternoon,
    Evening,
    #[default]
    Any,
}

impl TimeBlock {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeBlock::Morning => "morning",
            TimeBlock::Afternoon => "afternoon",
            TimeBlock::Evening => "evening",
            TimeBlock::Any => "any",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "morning" => Some(TimeBlock::Morning),
            "afternoon" => Some(TimeBlock::Afternoon),
            "evening" => Some(TimeBlock::Evening),
            "any" => Some(TimeBlock::Any),
            _ => None,
        }
    }

    /// Display rank: morning first, unscheduled last.
    pub fn rank(&self) -> u8 {
        match self {
            TimeBlock::Morning => 1,
            TimeBlock::Afternoon => 2,
            TimeBlock::Evening => 3,
            TimeBlock::Any => 4,
        }
    }
}

/// An account that owns tasks and categories. Authentication happens outside
/// the core; the stored credential is opaque here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub dark_mode: bool,
    pub created_at: i64,
}

/// A user-defined grouping for tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub created_at: i64,
}

/// A task in a user's daily list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub description: String,
    /// Estimated duration in minutes, always positive.
    pub estimated_minutes: i64,
    pub priority: Priority,
    pub time_block: TimeBlock,
    pub completed: bool,
    /// Manual order key, scoped to the owning user's task list.
    pub order_index: Option<i64>,
    pub created_at: i64,
}

/// A step within a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: i64,
    pub task_id: i64,
    pub description: String,
    pub completed: bool,
    /// Manual order key, scoped to the parent task's subtask list.
    pub order_index: Option<i64>,
    pub created_at: i64,
}

/// Render projection of a task, in the field names the presentation layer
/// expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: i64,
    pub description: String,
    pub estimated_time: i64,
    pub is_completed: bool,
    pub priority: Priority,
    pub time_block: TimeBlock,
    pub order_index: Option<i64>,
    pub category_id: Option<i64>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            description: task.description.clone(),
            estimated_time: task.estimated_minutes,
            is_completed: task.completed,
            priority: task.priority,
            time_block: task.time_block,
            order_index: task.order_index,
            category_id: task.category_id,
        }
    }
}

/// Render projection of a subtask.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskView {
    pub id: i64,
    pub description: String,
    pub is_completed: bool,
    pub order_index: Option<i64>,
    pub task_id: i64,
}

impl From<&Subtask> for SubtaskView {
    fn from(subtask: &Subtask) -> Self {
        Self {
            id: subtask.id,
            description: subtask.description.clone(),
            is_completed: subtask.completed,
            order_index: subtask.order_index,
            task_id: subtask.task_id,
        }
    }
}

/// Render projection of a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub color: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            color: category.color.clone(),
        }
    }
}
