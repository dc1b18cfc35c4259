//! In-memory integration tests for session bootstrap.

use eyre::ensure;
use intellitask::gateway::{adapters::memory::InMemoryBackend, domain::HttpMethod};
use intellitask::session::{
    adapters::memory::InMemoryIdentityProvider,
    domain::{Principal, Role, SessionPhase},
    ports::AuthEvent,
};
use rstest::rstest;

use super::helpers::{Client, admin, backend, developer, provider};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn interactive_sign_in_resolves_backend_role(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let mut client = Client::start(&provider, &backend)?;

    let principal = client.manager.sign_in().await?;
    let session = client.wait_for(|session| session.is_ready()).await?;

    ensure!(principal == developer());
    ensure!(session.identity() == Some(&developer()));
    ensure!(session.role() == Role::Developer);
    ensure!(client.session.current_credential()?.expose() == "dev-token");
    ensure!(backend.request_count(HttpMethod::Get, "/users/me") == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn admin_sign_in_yields_admin_role(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let mut client = Client::start(&provider, &backend)?;

    provider.emit(&AuthEvent::LoggedIn(admin()));
    let session = client.wait_for(|session| session.is_ready()).await?;

    ensure!(session.role() == Role::Admin);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn profile_without_role_forces_logout(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let mut client = Client::start(&provider, &backend)?;

    provider.emit(&AuthEvent::LoggedIn(Principal::new("limbo-1")));
    let session = client
        .wait_for(|session| session.phase() == SessionPhase::Unauthenticated)
        .await?;

    ensure!(session.identity().is_none());
    ensure!(session.role() == Role::None);
    ensure!(provider.sign_out_calls() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn token_rejected_by_backend_forces_logout(backend: InMemoryBackend) -> eyre::Result<()> {
    let stranger = Principal::new("stranger");
    let provider = InMemoryIdentityProvider::new().with_account(&stranger, "unknown-token");
    let mut client = Client::start(&provider, &backend)?;

    provider.emit(&AuthEvent::LoggedIn(stranger));
    let session = client
        .wait_for(|session| session.phase() == SessionPhase::Unauthenticated)
        .await?;

    ensure!(session.identity().is_none());
    ensure!(provider.sign_out_calls() == 1);
    let rejected = backend
        .requests()
        .into_iter()
        .filter(|recorded| recorded.token() == "unknown-token")
        .count();
    ensure!(rejected == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sign_out_clears_session_and_stops_backend_access(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let mut client = Client::start(&provider, &backend)?;
    provider.emit(&AuthEvent::LoggedIn(developer()));
    client.wait_for(|session| session.is_ready()).await?;

    client.manager.sign_out().await?;

    ensure!(client.session.phase() == SessionPhase::Unauthenticated);
    ensure!(client.session.current_credential().is_err());
    ensure!(provider.sign_out_calls() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_subscription_disables_session(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) {
    provider.fail_subscriptions("auth service down");

    let result = Client::start(&provider, &backend);

    assert!(result.is_err());
    assert_eq!(provider.subscriber_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stopping_event_loop_releases_subscription(
    provider: InMemoryIdentityProvider,
    backend: InMemoryBackend,
) -> eyre::Result<()> {
    let client = Client::start(&provider, &backend)?;
    ensure!(provider.subscriber_count() == 1);

    client.events.abort();
    ensure!(client.events.await.is_err_and(|err| err.is_cancelled()));

    ensure!(provider.subscriber_count() == 0);
    Ok(())
}
