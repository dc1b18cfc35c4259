//! Service layer for task discussions.

use std::sync::Arc;

use crate::board::{
    domain::{BoardError, Comment, NewComment, TaskId},
    ports::CommentBackend,
};

use super::BoardResult;

/// Reads and posts task comments.
#[derive(Clone)]
pub struct TaskCommentsService<B>
where
    B: CommentBackend,
{
    backend: Arc<B>,
}

impl<B> TaskCommentsService<B>
where
    B: CommentBackend,
{
    /// Creates a comments service.
    #[must_use]
    pub const fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    /// Lists a task's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Api`] when the backend call fails.
    pub async fn list(&self, task_id: &TaskId) -> BoardResult<Vec<Comment>> {
        let mut comments = self.backend.list_comments(task_id).await?;
        comments.sort_by_key(|comment| comment.timestamp);
        Ok(comments)
    }

    /// Posts a comment on a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyComment`] without calling the backend when
    /// `text` is blank, and [`BoardError::Api`] when the call fails.
    pub async fn add(&self, task_id: &TaskId, text: impl Into<String>) -> BoardResult<Comment> {
        let body: String = text.into();
        if body.trim().is_empty() {
            return Err(BoardError::EmptyComment);
        }
        let comment = self
            .backend
            .add_comment(task_id, &NewComment { text: body })
            .await?;
        tracing::debug!(task_id = %task_id, comment_id = %comment.comment_id, "comment posted");
        Ok(comment)
    }
}
