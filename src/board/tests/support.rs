//! Shared fixtures for board tests.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::DefaultClock;

use crate::board::{
    adapters::gateway::GatewayTaskBackend,
    domain::{ProjectId, Task, TaskId, TaskScope, TaskStatus, UserId},
    services::BoardTransitionEngine,
};
use crate::gateway::{
    adapters::memory::{BackendUser, InMemoryBackend},
    services::AuthenticatedApi,
};
use crate::session::{
    adapters::{gateway::GatewayRoleDirectory, memory::InMemoryIdentityProvider},
    domain::{Principal, Role, SessionPhase},
    ports::AuthEvent,
    services::SessionManager,
};

pub(super) type BoardManager =
    SessionManager<InMemoryIdentityProvider, GatewayRoleDirectory<InMemoryBackend>>;
pub(super) type BoardEngine =
    BoardTransitionEngine<GatewayTaskBackend<InMemoryBackend>, DefaultClock>;

pub(super) fn at(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).expect("timestamp in range")
}

pub(super) fn assigned_task(id: &str, status: TaskStatus) -> Task {
    Task::new(TaskId::new(id), ProjectId::new("p-1"), format!("Task {id}"))
        .with_status(status)
        .with_assignee(UserId::new("dev-1"))
        .with_approval(true)
        .with_timestamps(at(1_700_000_000), at(1_700_000_000))
}

/// Backend seeded with a developer owning `t-1` (To-Do) and `t-2`
/// (In Progress).
pub(super) fn seeded_backend() -> InMemoryBackend {
    InMemoryBackend::new()
        .with_user(
            "dev-token",
            BackendUser::new("dev-1", "Dev One").with_role(Role::Developer),
        )
        .with_task(assigned_task("t-1", TaskStatus::ToDo))
        .with_task(assigned_task("t-2", TaskStatus::InProgress))
}

/// Signs the developer in against `backend` and returns the live manager.
pub(super) async fn signed_in(backend: &InMemoryBackend) -> BoardManager {
    let provider =
        InMemoryIdentityProvider::new().with_account(&Principal::new("dev-1"), "dev-token");
    let manager = SessionManager::new(
        Arc::new(provider),
        Arc::new(GatewayRoleDirectory::new(Arc::new(backend.clone()))),
    );
    let session = manager
        .handle_event(AuthEvent::LoggedIn(Principal::new("dev-1")))
        .await;
    assert_eq!(session.phase(), SessionPhase::Ready);
    manager
}

pub(super) fn engine_for(backend: &InMemoryBackend, manager: &BoardManager) -> BoardEngine {
    let api = AuthenticatedApi::new(Arc::new(backend.clone()), manager.handle());
    BoardTransitionEngine::new(
        Arc::new(GatewayTaskBackend::new(api)),
        Arc::new(DefaultClock),
        TaskScope::Assigned,
    )
}
