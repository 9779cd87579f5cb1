//! Structured error types for command responses.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    MissingRequiredField,
    InvalidFieldValue,

    // Not found errors. Ownership failures surface as these so one user can
    // never learn whether another user's entity exists.
    UserNotFound,
    TaskNotFound,
    SubtaskNotFound,
    CategoryNotFound,

    // Conflict errors
    AlreadyExists,
    ConflictRetryExhausted,

    // Internal errors
    DatabaseError,
    InternalError,
}

/// Structured error for command responses.
#[derive(Debug, Serialize)]
pub struct CommandError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl CommandError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    // Convenience constructors

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("{} is required", field),
        )
        .with_field(field)
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, reason).with_field(field)
    }

    pub fn user_not_found(user_id: i64) -> Self {
        Self::new(ErrorCode::UserNotFound, format!("User not found: {}", user_id))
    }

    pub fn task_not_found(task_id: i64) -> Self {
        Self::new(ErrorCode::TaskNotFound, format!("Task not found: {}", task_id))
    }

    pub fn subtask_not_found(subtask_id: i64) -> Self {
        Self::new(
            ErrorCode::SubtaskNotFound,
            format!("Subtask not found: {}", subtask_id),
        )
    }

    pub fn category_not_found(category_id: i64) -> Self {
        Self::new(
            ErrorCode::CategoryNotFound,
            format!("Category not found: {}", category_id),
        )
    }

    pub fn already_exists(what: &str, name: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyExists,
            format!("A {} named '{}' already exists", what, name),
        )
    }

    pub fn conflict_retry_exhausted() -> Self {
        Self::new(
            ErrorCode::ConflictRetryExhausted,
            "Concurrent reorder conflict; retry failed, please try again",
        )
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, err.to_string())
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

// Allow using ? with anyhow errors by converting them
impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<CommandError>() {
            Ok(cmd_err) => cmd_err,
            Err(err) => CommandError::internal(err),
        }
    }
}

/// Result type for command operations.
pub type CommandResult<T> = std::result::Result<T, CommandError>;
