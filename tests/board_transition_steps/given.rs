//! Given steps for board transition BDD scenarios.

use std::sync::Arc;

use eyre::WrapErr;
use intellitask::board::{
    adapters::gateway::GatewayTaskBackend,
    domain::{ProjectId, Task, TaskScope, UserId},
    services::BoardTransitionEngine,
};
use intellitask::gateway::{
    adapters::memory::{BackendUser, InMemoryBackend},
    domain::{HttpError, HttpMethod},
    services::AuthenticatedApi,
};
use intellitask::session::{
    adapters::{gateway::GatewayRoleDirectory, memory::InMemoryIdentityProvider},
    domain::{Principal, Role},
    ports::AuthEvent,
    services::SessionManager,
};
use mockable::DefaultClock;
use rstest_bdd_macros::given;

use super::world::{BoardWorld, run_async, status, task_id};

#[given(r#"a signed-in "{role}" whose board holds task "{task}" in "{initial}""#)]
fn signed_in_with_task(
    world: &mut BoardWorld,
    role: String,
    task: String,
    initial: String,
) -> Result<(), eyre::Report> {
    let role = Role::try_from(role.as_str())
        .map_err(|err| eyre::eyre!("invalid role in scenario: {err}"))?;
    let principal = Principal::new("actor-1");
    let record = Task::new(task_id(&task), ProjectId::new("p1"), format!("Task {task}"))
        .with_status(status(&initial)?)
        .with_assignee(UserId::new("actor-1"))
        .with_approval(true);
    let backend = InMemoryBackend::new()
        .with_user("actor-token", BackendUser::new("actor-1", "Actor").with_role(role))
        .with_task(record);

    let provider = InMemoryIdentityProvider::new().with_account(&principal, "actor-token");
    let manager = Arc::new(SessionManager::new(
        Arc::new(provider),
        Arc::new(GatewayRoleDirectory::new(Arc::new(backend.clone()))),
    ));
    let session = run_async(manager.handle_event(AuthEvent::LoggedIn(principal)));
    eyre::ensure!(session.is_ready(), "sign-in did not complete: {session:?}");

    let scope = if role == Role::Admin {
        TaskScope::All
    } else {
        TaskScope::Assigned
    };
    let api = AuthenticatedApi::new(Arc::new(backend.clone()), manager.handle());
    let engine = BoardTransitionEngine::new(
        Arc::new(GatewayTaskBackend::new(api)),
        Arc::new(DefaultClock),
        scope,
    );
    run_async(engine.load()).wrap_err("initial board load")?;

    world.backend = backend;
    world.manager = Some(manager);
    world.engine = Some(engine);
    Ok(())
}

#[given(r#"the backend fails the next status update for "{task}" with HTTP {code:u16}"#)]
fn backend_fails_next_update(world: &mut BoardWorld, task: String, code: u16) {
    world.backend.fail_next(
        HttpMethod::Put,
        format!("/tasks/{task}/status"),
        HttpError::new(code, "Failed to update task status"),
    );
}

#[given(r#"another actor moves task "{task}" to "{target}""#)]
fn another_actor_moves_task(
    world: &mut BoardWorld,
    task: String,
    target: String,
) -> Result<(), eyre::Report> {
    let moved = world
        .backend
        .set_task_status(&task_id(&task), status(&target)?);
    eyre::ensure!(moved, "task {task} is not stored on the backend");
    Ok(())
}

#[given("the backend holds status updates")]
fn backend_holds_updates(world: &mut BoardWorld) {
    world.backend.hold_status_updates();
}
