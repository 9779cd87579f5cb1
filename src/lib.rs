//! Daywise: a personal daily task manager core.
//!
//! Users organize tasks into categories, break them into subtasks, and
//! order them for the day. The engine keeps per-scope integer order keys,
//! propagates completion state between tasks and their subtasks, and derives
//! the multi-key display order used for rendering.

pub mod cli;
pub mod completion;
pub mod db;
pub mod error;
pub mod sort;
pub mod types;
