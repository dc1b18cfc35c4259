//! Task record and its enumerated fields.

use super::{
    ParseTaskPriorityError, ParseTaskScopeError, ParseTaskStatusError, ProjectId, TaskId, UserId,
    timestamp,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board column a task sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Not started.
    #[default]
    #[serde(rename = "To-Do")]
    ToDo,
    /// Being worked on.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Awaiting review.
    #[serde(rename = "In Review")]
    InReview,
    /// Finished.
    #[serde(rename = "Done")]
    Done,
}

impl TaskStatus {
    /// Every status, in board column order.
    pub const ALL: [Self; 4] = [Self::ToDo, Self::InProgress, Self::InReview, Self::Done];

    /// Returns the wire and display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ToDo => "To-Do",
            Self::InProgress => "In Progress",
            Self::InReview => "In Review",
            Self::Done => "Done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    /// Parses a status, ignoring case, spaces, dashes and underscores.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized: String = value
            .chars()
            .filter(|ch| !matches!(ch, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "todo" => Ok(Self::ToDo),
            "inprogress" => Ok(Self::InProgress),
            "inreview" => Ok(Self::InReview),
            "done" => Ok(Self::Done),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Urgency of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Should be picked up soon.
    High,
    /// Blocks other work.
    Critical,
}

impl TaskPriority {
    /// Returns the wire and display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// Which task listing the board loads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TaskScope {
    /// Approved tasks assigned to the signed-in developer.
    #[default]
    Assigned,
    /// Every task on every project (admin only).
    All,
}

impl TaskScope {
    /// Returns the canonical configuration representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::All => "all",
        }
    }
}

impl TryFrom<&str> for TaskScope {
    type Error = ParseTaskScopeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "assigned" | "mine" => Ok(Self::Assigned),
            "all" => Ok(Self::All),
            _ => Err(ParseTaskScopeError(value.to_owned())),
        }
    }
}

/// Cached task record as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    task_id: TaskId,
    project_id: ProjectId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    assignee_id: Option<UserId>,
    #[serde(default)]
    creator: String,
    #[serde(default)]
    is_approved: bool,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates an unassigned, unapproved `To-Do` task.
    #[must_use]
    pub fn new(task_id: TaskId, project_id: ProjectId, title: impl Into<String>) -> Self {
        Self {
            task_id,
            project_id,
            title: title.into(),
            description: String::new(),
            status: TaskStatus::ToDo,
            priority: TaskPriority::Medium,
            assignee_id: None,
            creator: String::new(),
            is_approved: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Assigns the task to a user.
    #[must_use]
    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    /// Sets the creator label.
    #[must_use]
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = creator.into();
        self
    }

    /// Marks the task approved or unapproved.
    #[must_use]
    pub const fn with_approval(mut self, is_approved: bool) -> Self {
        self.is_approved = is_approved;
        self
    }

    /// Sets creation and update timestamps.
    #[must_use]
    pub const fn with_timestamps(
        mut self,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        self.created_at = created_at;
        self.updated_at = updated_at;
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    /// Returns the owning project.
    #[must_use]
    pub const fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the board column.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Returns the assignee, if any.
    #[must_use]
    pub const fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    /// Returns the creator label.
    #[must_use]
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// Returns `true` once an admin approved the task.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.is_approved
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Moves the task to another column.
    pub(crate) const fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Records a backend-side modification time.
    pub(crate) const fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}
