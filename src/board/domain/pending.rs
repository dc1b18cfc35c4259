//! In-flight optimistic status change.

use super::{TaskId, TaskStatus};
use chrono::{DateTime, Utc};

/// Status change applied locally and awaiting backend acknowledgement.
///
/// The generation is unique per engine and increases with every started
/// transition, so a settlement can tell whether a newer transition on the
/// same task has since replaced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTransition {
    task_id: TaskId,
    previous_status: TaskStatus,
    target_status: TaskStatus,
    initiated_at: DateTime<Utc>,
    generation: u64,
}

impl PendingTransition {
    /// Records a transition started at `initiated_at`.
    #[must_use]
    pub const fn new(
        task_id: TaskId,
        previous_status: TaskStatus,
        target_status: TaskStatus,
        initiated_at: DateTime<Utc>,
        generation: u64,
    ) -> Self {
        Self {
            task_id,
            previous_status,
            target_status,
            initiated_at,
            generation,
        }
    }

    /// Returns the task being moved.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the status the task had when the transition started.
    #[must_use]
    pub const fn previous_status(&self) -> TaskStatus {
        self.previous_status
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn target_status(&self) -> TaskStatus {
        self.target_status
    }

    /// Returns when the transition started.
    #[must_use]
    pub const fn initiated_at(&self) -> DateTime<Utc> {
        self.initiated_at
    }

    /// Returns the engine-wide sequence number of this transition.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}
