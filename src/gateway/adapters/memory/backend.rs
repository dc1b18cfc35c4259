//! Scriptable backend serving the task API from memory.
//!
//! Routes, access rules and error details follow the REST API closely
//! enough for session and board flows to run end to end without a server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::{Clock, DefaultClock};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::Semaphore;

use crate::board::domain::{Comment, CommentId, NewComment, Task, TaskId, TaskStatus, UserId};
use crate::gateway::{
    domain::{ApiError, ApiRequest, HttpError, HttpMethod},
    ports::{ApiResult, ApiTransport},
};
use crate::session::domain::{Credential, Role};

const INVALID_TOKEN: &str = "Invalid Firebase ID Token";
const ADMIN_REQUIRED: &str = "Operation not permitted. Admin access required.";
const DEVELOPER_REQUIRED: &str = "Operation not permitted. Developer access required.";
const TASK_FORBIDDEN: &str = "You are not authorized to access this task.";
const TASK_NOT_FOUND: &str = "Task not found";

/// User profile known to the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendUser {
    uid: UserId,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
}

impl BackendUser {
    /// Creates a profile without a stored role.
    ///
    /// Profiles without a role are treated as developers for access
    /// checks, but `/users/me` reports no role for them.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: UserId::new(uid),
            name: name.into(),
            email: None,
            role: None,
        }
    }

    /// Stores a role on the profile.
    #[must_use]
    pub const fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    /// Stores an email address on the profile.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn uid(&self) -> &UserId {
        &self.uid
    }

    fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }
}

/// One request received by an [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    token: String,
    request: ApiRequest,
}

impl RecordedRequest {
    /// Returns the bearer token the request carried.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns the request.
    #[must_use]
    pub const fn request(&self) -> &ApiRequest {
        &self.request
    }
}

#[derive(Debug)]
struct ScriptedFailure {
    method: HttpMethod,
    path: String,
    error: ApiError,
}

#[derive(Debug, Default)]
struct BackendState {
    users: HashMap<String, BackendUser>,
    tasks: Vec<Task>,
    comments: HashMap<TaskId, Vec<Comment>>,
    failures: Vec<ScriptedFailure>,
    requests: Vec<RecordedRequest>,
    hold_status_updates: bool,
}

#[derive(Debug, Deserialize)]
struct StatusUpdate {
    status: TaskStatus,
}

/// Thread-safe backend double implementing [`ApiTransport`].
///
/// Besides serving routes it records every request, can fail chosen
/// requests on demand and can hold status updates until released.
#[derive(Clone)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
    status_gate: Arc<Semaphore>,
    clock: Arc<DefaultClock>,
}

impl fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("state", &self.state)
            .field("status_permits", &self.status_gate.available_permits())
            .finish_non_exhaustive()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState::default())),
            status_gate: Arc::new(Semaphore::new(0)),
            clock: Arc::new(DefaultClock),
        }
    }
}

impl InMemoryBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `token` as the bearer credential of `user`.
    #[must_use]
    pub fn with_user(self, token: impl Into<String>, user: BackendUser) -> Self {
        self.state().users.insert(token.into(), user);
        self
    }

    /// Stores a task.
    #[must_use]
    pub fn with_task(self, task: Task) -> Self {
        self.state().tasks.push(task);
        self
    }

    /// Makes the next request matching `method` and `path` fail with
    /// `error` instead of being served.
    pub fn fail_next(
        &self,
        method: HttpMethod,
        path: impl Into<String>,
        error: impl Into<ApiError>,
    ) {
        self.state().failures.push(ScriptedFailure {
            method,
            path: path.into(),
            error: error.into(),
        });
    }

    /// Blocks status updates until permits are released.
    pub fn hold_status_updates(&self) {
        self.state().hold_status_updates = true;
    }

    /// Lets `count` held status updates proceed.
    pub fn release_status_updates(&self, count: usize) {
        self.status_gate.add_permits(count);
    }

    /// Changes a stored task's status as another client would.
    ///
    /// Returns `false` when the task does not exist.
    #[must_use]
    pub fn set_task_status(&self, task_id: &TaskId, status: TaskStatus) -> bool {
        let now = self.clock.utc();
        let mut state = self.state();
        state
            .tasks
            .iter_mut()
            .find(|task| task.task_id() == task_id)
            .map(|task| {
                task.set_status(status);
                task.touch(now);
            })
            .is_some()
    }

    /// Returns a stored task.
    #[must_use]
    pub fn stored_task(&self, task_id: &TaskId) -> Option<Task> {
        self.state()
            .tasks
            .iter()
            .find(|task| task.task_id() == task_id)
            .cloned()
    }

    /// Returns every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state().requests.clone()
    }

    /// Returns how many requests matched `method` and `path`.
    #[must_use]
    pub fn request_count(&self, method: HttpMethod, path: &str) -> usize {
        self.state()
            .requests
            .iter()
            .filter(|recorded| {
                recorded.request.method() == method && recorded.request.path() == path
            })
            .count()
    }

    fn state(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ApiTransport for InMemoryBackend {
    async fn send(&self, credential: &Credential, request: ApiRequest) -> ApiResult<Option<Value>> {
        let gated = {
            let mut state = self.state();
            state.requests.push(RecordedRequest {
                token: credential.expose().to_owned(),
                request: request.clone(),
            });
            state.hold_status_updates && is_status_update(&request)
        };
        if gated {
            self.status_gate
                .acquire()
                .await
                .map_err(ApiError::transport)?
                .forget();
        }

        let now = self.clock.utc();
        let mut state = self.state();
        if let Some(error) = state.take_failure(&request) {
            tracing::debug!(
                method = %request.method(),
                path = request.path(),
                error = %error,
                "serving scripted failure"
            );
            return Err(error);
        }
        state.route(credential.expose(), &request, now)
    }
}

fn is_status_update(request: &ApiRequest) -> bool {
    request.method() == HttpMethod::Put
        && matches!(segments(request.path()).as_slice(), ["tasks", _, "status"])
}

fn segments(path: &str) -> Vec<&str> {
    path.trim_matches('/').split('/').collect()
}

fn forbidden(message: &str) -> ApiError {
    HttpError::new(403, message).into()
}

fn not_found(message: &str) -> ApiError {
    HttpError::new(404, message).into()
}

fn to_json<T: Serialize>(value: &T) -> ApiResult<Option<Value>> {
    serde_json::to_value(value)
        .map(Some)
        .map_err(ApiError::serialization)
}

fn parse_body<T: DeserializeOwned>(request: &ApiRequest) -> ApiResult<T> {
    let body = request.body().cloned().unwrap_or(Value::Null);
    serde_json::from_value(body)
        .map_err(|err| HttpError::new(422, format!("invalid request body: {err}")).into())
}

impl BackendState {
    fn take_failure(&mut self, request: &ApiRequest) -> Option<ApiError> {
        let position = self.failures.iter().position(|failure| {
            failure.method == request.method() && failure.path == request.path()
        })?;
        Some(self.failures.remove(position).error)
    }

    fn route(
        &mut self,
        token: &str,
        request: &ApiRequest,
        now: DateTime<Utc>,
    ) -> ApiResult<Option<Value>> {
        let user = self
            .users
            .get(token)
            .cloned()
            .ok_or_else(|| ApiError::from(HttpError::new(401, INVALID_TOKEN)))?;

        match (request.method(), segments(request.path()).as_slice()) {
            (HttpMethod::Get, ["users", "me"]) => to_json(&user),
            (HttpMethod::Get, ["tasks", "my"]) => {
                if user.is_admin() {
                    return Err(forbidden(DEVELOPER_REQUIRED));
                }
                let mine: Vec<&Task> = self
                    .tasks
                    .iter()
                    .filter(|task| task.assignee_id() == Some(user.uid()) && task.is_approved())
                    .collect();
                to_json(&mine)
            }
            (HttpMethod::Get, ["admin", "tasks"]) => {
                if !user.is_admin() {
                    return Err(forbidden(ADMIN_REQUIRED));
                }
                let mut all: Vec<&Task> = self.tasks.iter().collect();
                all.sort_by_key(|task| std::cmp::Reverse(task.created_at()));
                to_json(&all)
            }
            (HttpMethod::Put, ["tasks", task_id, "status"]) => {
                if user.is_admin() {
                    return Err(forbidden(DEVELOPER_REQUIRED));
                }
                let update: StatusUpdate = parse_body(request)?;
                let task = self.accessible_task(&user, task_id)?;
                task.set_status(update.status);
                task.touch(now);
                to_json(&*task)
            }
            (HttpMethod::Get, ["tasks", task_id, "comments"]) => {
                self.accessible_task(&user, task_id)?;
                let mut comments = self
                    .comments
                    .get(&TaskId::new(*task_id))
                    .cloned()
                    .unwrap_or_default();
                comments.sort_by_key(|comment| comment.timestamp);
                to_json(&comments)
            }
            (HttpMethod::Post, ["tasks", task_id, "comments"]) => {
                let new_comment: NewComment = parse_body(request)?;
                self.accessible_task(&user, task_id)?;
                let comment = Comment {
                    comment_id: CommentId::new(uuid::Uuid::new_v4().to_string()),
                    task_id: TaskId::new(*task_id),
                    author_id: user.uid().clone(),
                    author_name: user.name.clone(),
                    text: new_comment.text,
                    timestamp: now,
                };
                self.comments
                    .entry(comment.task_id.clone())
                    .or_default()
                    .push(comment.clone());
                to_json(&comment)
            }
            (HttpMethod::Get, [""]) => Ok(Some(json!({
                "message": "Welcome to the IntelliTask API!"
            }))),
            _ => Err(not_found("Not Found")),
        }
    }

    fn accessible_task(&mut self, user: &BackendUser, task_id: &str) -> ApiResult<&mut Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.task_id().as_str() == task_id)
            .ok_or_else(|| not_found(TASK_NOT_FOUND))?;
        let permitted = user.is_admin()
            || (task.assignee_id() == Some(user.uid()) && task.is_approved());
        if permitted {
            Ok(task)
        } else {
            Err(forbidden(TASK_FORBIDDEN))
        }
    }
}
