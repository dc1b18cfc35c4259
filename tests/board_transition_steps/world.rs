//! Shared world state for board transition BDD scenarios.

use std::sync::Arc;

use intellitask::board::{
    adapters::gateway::GatewayTaskBackend,
    domain::{TaskId, TaskStatus},
    services::{BoardTransitionEngine, TransitionHandle, TransitionOutcome},
};
use intellitask::gateway::adapters::memory::InMemoryBackend;
use intellitask::session::{
    adapters::{gateway::GatewayRoleDirectory, memory::InMemoryIdentityProvider},
    services::SessionManager,
};
use mockable::DefaultClock;
use rstest::fixture;

/// Session manager type used by the BDD world.
pub type WorldManager =
    SessionManager<InMemoryIdentityProvider, GatewayRoleDirectory<InMemoryBackend>>;

/// Board engine type used by the BDD world.
pub type WorldEngine = BoardTransitionEngine<GatewayTaskBackend<InMemoryBackend>, DefaultClock>;

/// Scenario world for board transition behaviour tests.
#[derive(Default)]
pub struct BoardWorld {
    pub backend: InMemoryBackend,
    pub manager: Option<Arc<WorldManager>>,
    pub engine: Option<WorldEngine>,
    pub in_flight: Option<TransitionHandle>,
    pub outcome: Option<TransitionOutcome>,
}

impl BoardWorld {
    /// Returns the engine, failing when no actor has signed in yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the scenario skipped the sign-in step.
    pub fn engine(&self) -> eyre::Result<&WorldEngine> {
        self.engine
            .as_ref()
            .ok_or_else(|| eyre::eyre!("no board loaded in scenario world"))
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardWorld {
    BoardWorld::default()
}

/// Parses a status written in a feature file.
///
/// # Errors
///
/// Returns an error for unknown status names.
pub fn status(raw: &str) -> eyre::Result<TaskStatus> {
    TaskStatus::try_from(raw).map_err(|err| eyre::eyre!("invalid status in scenario: {err}"))
}

/// Wraps a task identifier written in a feature file.
#[must_use]
pub fn task_id(raw: &str) -> TaskId {
    TaskId::new(raw)
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
