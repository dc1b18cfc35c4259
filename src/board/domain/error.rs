//! Error types for the task board.

use super::TaskId;
use crate::gateway::domain::ApiError;
use thiserror::Error;

/// Errors returned by board operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardError {
    /// The task is not in the local cache.
    #[error("task not on board: {0}")]
    UnknownTask(TaskId),

    /// Reloading the task list failed; the previous cache was kept.
    #[error("failed to load tasks: {0}")]
    Fetch(#[source] ApiError),

    /// A transition was started outside a Tokio runtime.
    #[error("no tokio runtime available to settle the transition")]
    NoRuntime,

    /// A comment had no text.
    #[error("comment text must not be empty")]
    EmptyComment,

    /// Any other backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Error returned while parsing a task status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing a task priority.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing a task scope.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task scope '{0}', expected assigned or all")]
pub struct ParseTaskScopeError(pub String);
