//! In-memory integration tests for board flows.

use eyre::{bail, ensure};
use intellitask::board::{
    domain::{BoardError, TaskId, TaskScope, TaskStatus},
    services::TransitionOutcome,
};
use intellitask::gateway::{
    adapters::memory::InMemoryBackend,
    domain::{ApiError, HttpError, HttpMethod},
};
use intellitask::session::{adapters::memory::InMemoryIdentityProvider, ports::AuthEvent};
use rstest::rstest;

use super::helpers::{Client, admin, backend, developer, provider};

async fn signed_in(
    provider: &InMemoryIdentityProvider,
    backend: &InMemoryBackend,
    principal: intellitask::session::domain::Principal,
) -> eyre::Result<Client> {
    let mut client = Client::start(provider, backend)?;
    provider.emit(&AuthEvent::LoggedIn(principal));
    client.wait_for(|session| session.is_ready()).await?;
    Ok(client)
}

fn t1() -> TaskId {
    TaskId::new("t1")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn developer_moves_task_to_done(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = signed_in(&provider, &backend, developer()).await?;
    let engine = client.engine(&backend, TaskScope::Assigned);
    ensure!(engine.load().await? == 2);

    let outcome = engine
        .begin_transition(&t1(), TaskStatus::Done)?
        .into_handle()
        .ok_or_else(|| eyre::eyre!("transition should start"))?
        .settled()
        .await;

    ensure!(outcome == TransitionOutcome::Confirmed);
    ensure!(engine.task(&t1()).map(|task| task.status()) == Some(TaskStatus::Done));
    ensure!(engine.pending().is_empty());
    ensure!(backend.stored_task(&t1()).map(|task| task.status()) == Some(TaskStatus::Done));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn server_error_with_concurrent_edit_adopts_backend_status(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = signed_in(&provider, &backend, developer()).await?;
    let engine = client.engine(&backend, TaskScope::Assigned);
    engine.load().await?;
    backend.fail_next(
        HttpMethod::Put,
        "/tasks/t1/status",
        HttpError::new(500, "Failed to update task status"),
    );
    ensure!(backend.set_task_status(&t1(), TaskStatus::InReview));

    let outcome = engine
        .begin_transition(&t1(), TaskStatus::Done)?
        .into_handle()
        .ok_or_else(|| eyre::eyre!("transition should start"))?
        .settled()
        .await;

    ensure!(matches!(outcome, TransitionOutcome::Resynchronized { .. }));
    ensure!(engine.task(&t1()).map(|task| task.status()) == Some(TaskStatus::InReview));
    ensure!(engine.pending().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_board_lists_everything_and_reverts_refused_moves(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = signed_in(&provider, &backend, admin()).await?;
    let engine = client.engine(&backend, TaskScope::All);
    engine.load().await?;

    let ids: Vec<_> = engine
        .tasks()
        .iter()
        .map(|task| task.task_id().as_str().to_owned())
        .collect();
    ensure!(ids == vec!["t3", "t2", "t1"]);

    let outcome = engine
        .begin_transition(&t1(), TaskStatus::InProgress)?
        .into_handle()
        .ok_or_else(|| eyre::eyre!("transition should start"))?
        .settled()
        .await;

    let TransitionOutcome::Resynchronized { error } = outcome else {
        bail!("expected resynchronisation, got {outcome:?}");
    };
    ensure!(error.status() == Some(403));
    ensure!(engine.task(&t1()).map(|task| task.status()) == Some(TaskStatus::ToDo));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn board_cannot_load_before_sign_in(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = Client::start(&provider, &backend)?;
    let engine = client.engine(&backend, TaskScope::Assigned);

    let result = engine.load().await;

    ensure!(matches!(result, Err(BoardError::Fetch(ApiError::Unauthenticated))));
    ensure!(engine.tasks().is_empty());
    ensure!(backend.requests().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_round_trip_through_backend(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = signed_in(&provider, &backend, developer()).await?;
    let comments = client.comments(&backend);

    let first = comments.add(&t1(), "Picked this up").await?;
    let second = comments.add(&t1(), "Pushed a draft").await?;
    let listed = comments.list(&t1()).await?;

    ensure!(first.author_name == "Dev One");
    ensure!(listed == vec![first, second]);
    ensure!(matches!(
        comments.add(&t1(), "  ").await,
        Err(BoardError::EmptyComment)
    ));
    ensure!(backend.request_count(HttpMethod::Post, "/tasks/t1/comments") == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn comments_on_foreign_task_are_refused(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = signed_in(&provider, &backend, developer()).await?;

    let result = client.comments(&backend).list(&TaskId::new("t3")).await;

    let Err(BoardError::Api(ApiError::Http(error))) = result else {
        bail!("expected HTTP error, got {result:?}");
    };
    ensure!(error.status == 403);
    Ok(())
}
