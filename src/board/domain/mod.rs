//! Domain model for the task board.
//!
//! Task records mirror the backend's wire format. Only the status field is
//! ever changed locally, and only through the transition engine.

mod comment;
mod error;
mod ids;
mod pending;
mod task;
mod timestamp;

pub use comment::{Comment, NewComment};
pub use error::{
    BoardError, ParseTaskPriorityError, ParseTaskScopeError, ParseTaskStatusError,
};
pub use ids::{CommentId, ProjectId, TaskId, UserId};
pub use pending::PendingTransition;
pub use task::{Task, TaskPriority, TaskScope, TaskStatus};
