//! Task discussion comments.

use super::{CommentId, TaskId, UserId, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Backend-assigned identifier.
    pub comment_id: CommentId,
    /// Task the comment belongs to.
    pub task_id: TaskId,
    /// Author's user identifier.
    pub author_id: UserId,
    /// Author's display name at posting time.
    pub author_name: String,
    /// Comment body.
    pub text: String,
    /// Posting time.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

/// Request body for posting a comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
    /// Comment body.
    pub text: String,
}
