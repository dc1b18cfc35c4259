//! Backend ports for task listing, status updates and comments.

use crate::board::domain::{Comment, NewComment, Task, TaskId, TaskScope, TaskStatus};
use crate::gateway::ports::ApiResult;
use async_trait::async_trait;

/// Task endpoints consumed by the transition engine.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Fetches the full task set visible in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::gateway::domain::ApiError`] when the call fails.
    async fn list_tasks(&self, scope: TaskScope) -> ApiResult<Vec<Task>>;

    /// Sets a task's status on the backend.
    ///
    /// Returns the updated record when the backend echoes one.
    ///
    /// # Errors
    ///
    /// Returns [`crate::gateway::domain::ApiError`] when the backend
    /// rejects the change or cannot be reached.
    async fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> ApiResult<Option<Task>>;
}

/// Comment endpoints for task discussions.
#[async_trait]
pub trait CommentBackend: Send + Sync {
    /// Lists the comments on a task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::gateway::domain::ApiError`] when the call fails.
    async fn list_comments(&self, task_id: &TaskId) -> ApiResult<Vec<Comment>>;

    /// Posts a comment on a task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::gateway::domain::ApiError`] when the call fails.
    async fn add_comment(&self, task_id: &TaskId, comment: &NewComment) -> ApiResult<Comment>;
}
