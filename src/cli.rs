//! CLI command definitions for daywise.
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::db::ordering::MoveDirection;
use crate::types::{Priority, TimeBlock};
use clap::{Parser, Subcommand, ValueEnum};

/// Direction for reorder commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

/// Daywise personal daily task manager
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the SQLite database file
    #[arg(short, long, default_value = "daywise.db", global = true)]
    pub database: String,

    /// Acting username (stands in for the session provider)
    #[arg(short, long, default_value = "default", global = true)]
    pub user: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the acting user, seeded with starter categories and sample tasks
    Register {
        /// Create an empty account without the starter data
        #[arg(long)]
        empty: bool,
    },

    /// Show the day's tasks in display order, with progress
    List {
        /// Restrict to one category id
        #[arg(short, long)]
        category: Option<i64>,

        /// Emit JSON for scripted use
        #[arg(long)]
        json: bool,
    },

    /// Add a task at the end of the list
    Add {
        description: String,

        /// Estimated duration in minutes
        #[arg(short, long, default_value_t = 30)]
        minutes: i64,

        #[arg(short, long, value_enum, default_value = "medium")]
        priority: Priority,

        #[arg(short, long, value_enum, default_value = "any")]
        time_block: TimeBlock,

        /// Category id to file the task under
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Replace every editable field of a task
    Edit {
        id: i64,
        description: String,

        /// Estimated duration in minutes
        #[arg(short, long)]
        minutes: i64,

        #[arg(short, long, value_enum, default_value = "medium")]
        priority: Priority,

        #[arg(short, long, value_enum, default_value = "any")]
        time_block: TimeBlock,

        /// Category id to file the task under
        #[arg(short, long)]
        category: Option<i64>,
    },

    /// Flip a task's completion flag
    Toggle { id: i64 },

    /// Move a task one step within its completion cohort
    Move {
        id: i64,
        #[arg(value_enum)]
        direction: Direction,
    },

    /// Delete a task and all its subtasks
    Delete { id: i64 },

    /// Mark every task and subtask incomplete
    Reset,

    /// Flip the dark-mode display preference
    DarkMode,

    /// Subtask operations
    #[command(subcommand)]
    Subtask(SubtaskCommand),

    /// Category operations
    #[command(subcommand)]
    Category(CategoryCommand),
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    /// Add a subtask at the end of a task's list
    Add { task_id: i64, description: String },

    /// List a task's subtasks
    List { task_id: i64 },

    /// Rename a subtask
    Edit { id: i64, description: String },

    /// Flip a subtask's completion flag
    Toggle { id: i64 },

    /// Move a subtask one step within its completion cohort
    Move {
        id: i64,
        #[arg(value_enum)]
        direction: Direction,
    },

    /// Delete a subtask
    Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    /// Create a category
    Add {
        name: String,
        #[arg(long)]
        color: Option<String>,
    },

    /// List the user's categories
    List,

    /// Rename or recolor a category
    Edit {
        id: i64,
        name: String,
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a category; its tasks survive uncategorized
    Delete { id: i64 },
}
