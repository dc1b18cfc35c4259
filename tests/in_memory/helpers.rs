//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use intellitask::board::{
    adapters::gateway::GatewayTaskBackend,
    domain::{ProjectId, Task, TaskId, TaskScope, TaskStatus, UserId},
    services::{BoardTransitionEngine, TaskCommentsService},
};
use intellitask::gateway::{
    adapters::memory::{BackendUser, InMemoryBackend},
    services::AuthenticatedApi,
};
use intellitask::session::{
    adapters::{gateway::GatewayRoleDirectory, memory::InMemoryIdentityProvider},
    domain::{Principal, Role, Session},
    services::{SessionHandle, SessionManager},
};
use mockable::DefaultClock;
use rstest::fixture;
use tokio::task::JoinHandle;

/// Session manager wired to the in-memory provider and backend.
pub type TestManager =
    SessionManager<InMemoryIdentityProvider, GatewayRoleDirectory<InMemoryBackend>>;

/// Gateway-backed board ports.
pub type TestTasks = GatewayTaskBackend<InMemoryBackend>;

/// Board engine over the in-memory backend.
pub type TestEngine = BoardTransitionEngine<TestTasks, DefaultClock>;

/// Converts Unix seconds to a UTC timestamp.
///
/// # Panics
///
/// Panics when `seconds` is outside chrono's range.
#[must_use]
pub fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).expect("timestamp in range")
}

/// Developer principal known to both provider and backend.
#[must_use]
pub fn developer() -> Principal {
    Principal::new("dev-1").with_email("dev@example.test")
}

/// Admin principal known to both provider and backend.
#[must_use]
pub fn admin() -> Principal {
    Principal::new("admin-1").with_email("admin@example.test")
}

/// Builds an approved task assigned to `assignee`.
#[must_use]
pub fn task(id: &str, assignee: &str, status: TaskStatus, created: i64) -> Task {
    Task::new(TaskId::new(id), ProjectId::new("p-1"), format!("Task {id}"))
        .with_status(status)
        .with_assignee(UserId::new(assignee))
        .with_approval(true)
        .with_creator("AI")
        .with_timestamps(at(created), at(created))
}

/// Provides a backend with a developer, an admin and a user without a
/// role, plus three tasks.
#[fixture]
pub fn backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_user(
            "dev-token",
            BackendUser::new("dev-1", "Dev One").with_role(Role::Developer),
        )
        .with_user(
            "admin-token",
            BackendUser::new("admin-1", "Admin One").with_role(Role::Admin),
        )
        .with_user("limbo-token", BackendUser::new("limbo-1", "No Role"))
        .with_task(task("t1", "dev-1", TaskStatus::ToDo, 1_700_000_000))
        .with_task(task("t2", "dev-1", TaskStatus::InProgress, 1_700_000_100))
        .with_task(task("t3", "someone-else", TaskStatus::Done, 1_700_000_200))
}

/// Provides an identity provider holding accounts for every backend user.
#[fixture]
pub fn provider() -> InMemoryIdentityProvider {
    InMemoryIdentityProvider::new()
        .with_account(&developer(), "dev-token")
        .with_account(&admin(), "admin-token")
        .with_account(&Principal::new("limbo-1"), "limbo-token")
}

/// A running client: session manager with its event loop, plus board
/// services sharing the manager's session.
pub struct Client {
    /// Manager owning the session.
    pub manager: Arc<TestManager>,
    /// Observer of the session.
    pub session: SessionHandle,
    /// Event loop driving the manager.
    pub events: JoinHandle<()>,
}

impl Client {
    /// Subscribes a new manager to `provider` and starts its event loop.
    ///
    /// # Errors
    ///
    /// Returns an error when the subscription is refused.
    pub fn start(
        provider: &InMemoryIdentityProvider,
        backend: &InMemoryBackend,
    ) -> eyre::Result<Self> {
        let manager = Arc::new(SessionManager::new(
            Arc::new(provider.clone()),
            Arc::new(GatewayRoleDirectory::new(Arc::new(backend.clone()))),
        ));
        let subscription = manager.subscribe()?;
        let worker = Arc::clone(&manager);
        let events = tokio::spawn(async move { worker.run(subscription).await });
        Ok(Self {
            session: manager.handle(),
            manager,
            events,
        })
    }

    /// Waits until the session satisfies `done`.
    ///
    /// # Errors
    ///
    /// Returns an error when the manager goes away first.
    pub async fn wait_for(&mut self, done: impl Fn(&Session) -> bool) -> eyre::Result<Session> {
        loop {
            let current = self.session.current();
            if done(&current) {
                return Ok(current);
            }
            self.session
                .changed()
                .await
                .ok_or_else(|| eyre::eyre!("session manager dropped"))?;
        }
    }

    /// Builds the board ports over `backend` for this client's session.
    #[must_use]
    pub fn tasks(&self, backend: &InMemoryBackend) -> Arc<TestTasks> {
        let api = AuthenticatedApi::new(Arc::new(backend.clone()), self.session.clone());
        Arc::new(GatewayTaskBackend::new(api))
    }

    /// Builds a board engine for `scope`.
    #[must_use]
    pub fn engine(&self, backend: &InMemoryBackend, scope: TaskScope) -> TestEngine {
        BoardTransitionEngine::new(self.tasks(backend), Arc::new(DefaultClock), scope)
    }

    /// Builds a comments service.
    #[must_use]
    pub fn comments(&self, backend: &InMemoryBackend) -> TaskCommentsService<TestTasks> {
        TaskCommentsService::new(self.tasks(backend))
    }
}
