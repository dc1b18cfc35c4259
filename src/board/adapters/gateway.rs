//! Board ports backed by the authenticated REST gateway.

use async_trait::async_trait;
use serde::Serialize;

use crate::board::{
    domain::{Comment, NewComment, Task, TaskId, TaskScope, TaskStatus},
    ports::{CommentBackend, TaskBackend},
};
use crate::gateway::{
    ports::{ApiResult, ApiTransport},
    services::AuthenticatedApi,
};

#[derive(Debug, Serialize)]
struct StatusUpdate {
    status: TaskStatus,
}

/// Task and comment endpoints of the `IntelliTask` backend.
pub struct GatewayTaskBackend<T>
where
    T: ApiTransport,
{
    api: AuthenticatedApi<T>,
}

impl<T> GatewayTaskBackend<T>
where
    T: ApiTransport,
{
    /// Creates a backend issuing calls through `api`.
    #[must_use]
    pub const fn new(api: AuthenticatedApi<T>) -> Self {
        Self { api }
    }
}

/// Returns the listing path for a scope.
#[must_use]
pub const fn listing_path(scope: TaskScope) -> &'static str {
    match scope {
        TaskScope::Assigned => "/tasks/my",
        TaskScope::All => "/admin/tasks",
    }
}

#[async_trait]
impl<T> TaskBackend for GatewayTaskBackend<T>
where
    T: ApiTransport,
{
    async fn list_tasks(&self, scope: TaskScope) -> ApiResult<Vec<Task>> {
        self.api.get_json(listing_path(scope)).await
    }

    async fn update_status(&self, task_id: &TaskId, status: TaskStatus) -> ApiResult<Option<Task>> {
        let path = format!("/tasks/{task_id}/status");
        self.api.put_json(&path, &StatusUpdate { status }).await
    }
}

#[async_trait]
impl<T> CommentBackend for GatewayTaskBackend<T>
where
    T: ApiTransport,
{
    async fn list_comments(&self, task_id: &TaskId) -> ApiResult<Vec<Comment>> {
        let path = format!("/tasks/{task_id}/comments");
        self.api.get_json(&path).await
    }

    async fn add_comment(&self, task_id: &TaskId, comment: &NewComment) -> ApiResult<Comment> {
        let path = format!("/tasks/{task_id}/comments");
        self.api.post_json(&path, comment).await
    }
}
