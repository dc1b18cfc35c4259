//! Command-line client for the `IntelliTask` backend.
//!
//! Usage:
//!
//! ```text
//! intellitask whoami
//! intellitask tasks
//! intellitask move <task-id> <status>
//! intellitask comments <task-id>
//! ```
//!
//! The signed-in identity is taken from `INTELLITASK_UID` and
//! `INTELLITASK_ID_TOKEN`; connection settings come from the variables read
//! by [`ClientConfig::from_env`]. Results are reported through `tracing`, so
//! set `RUST_LOG` to adjust verbosity.

use std::env;
use std::sync::Arc;

use intellitask::board::{
    adapters::gateway::GatewayTaskBackend,
    domain::{BoardError, ParseTaskStatusError, TaskId, TaskStatus},
    services::{BoardTransitionEngine, TaskCommentsService, TransitionOutcome},
};
use intellitask::config::{ClientConfig, ConfigError};
use intellitask::gateway::{
    adapters::http::HttpApiTransport, domain::ApiError, services::AuthenticatedApi,
};
use intellitask::session::{
    adapters::{gateway::GatewayRoleDirectory, static_token::StaticTokenIdentityProvider},
    domain::{Principal, Session},
    services::{SessionError, SessionManager},
};
use intellitask::telemetry::{TelemetryError, init_tracing};
use mockable::DefaultClock;
use thiserror::Error;
use tokio::runtime::Builder;

const UID_VAR: &str = "INTELLITASK_UID";
const ID_TOKEN_VAR: &str = "INTELLITASK_ID_TOKEN";
const DEFAULT_LOG_FILTER: &str = "intellitask=info";

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

type CliTasks = GatewayTaskBackend<HttpApiTransport>;

#[derive(Debug, Error)]
enum CliError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Status(#[from] ParseTaskStatusError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] std::io::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("session is not ready (phase: {0})")]
    NotReady(&'static str),
    #[error("status update was not applied: {0}")]
    TransitionFailed(String),
}

#[derive(Debug)]
enum Operation {
    WhoAmI,
    Tasks,
    Move { task_id: TaskId, target: TaskStatus },
    Comments { task_id: TaskId },
}

impl Operation {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, CliError> {
        let _program = args.next();
        let name = args
            .next()
            .ok_or_else(|| CliError::InvalidArgs("missing operation argument".into()))?;
        let operation = match name.as_str() {
            "whoami" => Self::WhoAmI,
            "tasks" => Self::Tasks,
            "move" => {
                let task_id = next_task_id(&mut args)?;
                let raw_status = args
                    .next()
                    .ok_or_else(|| CliError::InvalidArgs("missing status argument".into()))?;
                Self::Move {
                    task_id,
                    target: TaskStatus::try_from(raw_status.as_str())?,
                }
            }
            "comments" => Self::Comments {
                task_id: next_task_id(&mut args)?,
            },
            other => {
                return Err(CliError::InvalidArgs(format!(
                    "unknown operation '{other}'; expected whoami, tasks, move, or comments"
                )));
            }
        };
        if let Some(extra) = args.next() {
            return Err(CliError::InvalidArgs(format!(
                "unexpected extra argument: {extra}"
            )));
        }
        Ok(operation)
    }
}

fn next_task_id(args: &mut impl Iterator<Item = String>) -> Result<TaskId, CliError> {
    args.next()
        .map(TaskId::new)
        .ok_or_else(|| CliError::InvalidArgs("missing task id argument".into()))
}

fn main() -> Result<(), BoxError> {
    run().map_err(|err| {
        tracing::error!(error = %err, "intellitask failed");
        err.into()
    })
}

fn run() -> Result<(), CliError> {
    init_tracing(DEFAULT_LOG_FILTER)?;
    let operation = Operation::parse(env::args())?;
    let config = ClientConfig::from_env()?;
    let uid = required_env(UID_VAR)?;
    let token = required_env(ID_TOKEN_VAR)?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::RuntimeInit)?;
    runtime.block_on(execute(operation, &config, Principal::new(uid), token))
}

fn required_env(key: &'static str) -> Result<String, CliError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(CliError::MissingEnv(key))
}

async fn execute(
    operation: Operation,
    config: &ClientConfig,
    principal: Principal,
    token: String,
) -> Result<(), CliError> {
    let transport = Arc::new(HttpApiTransport::new(config)?);
    let provider = Arc::new(StaticTokenIdentityProvider::new(principal, token));
    let directory = Arc::new(GatewayRoleDirectory::new(Arc::clone(&transport)));
    let manager = SessionManager::new(provider, directory);

    let session = bootstrap(&manager).await?;
    let api = AuthenticatedApi::new(transport, manager.handle());
    let tasks = Arc::new(GatewayTaskBackend::new(api));

    match operation {
        Operation::WhoAmI => {
            report_session(&session);
            Ok(())
        }
        Operation::Tasks => list_tasks(tasks, config).await,
        Operation::Move { task_id, target } => move_task(tasks, config, &task_id, target).await,
        Operation::Comments { task_id } => list_comments(tasks, &task_id).await,
    }
}

async fn bootstrap<P, D>(manager: &SessionManager<P, D>) -> Result<Session, CliError>
where
    P: intellitask::session::ports::IdentityProvider,
    D: intellitask::session::ports::RoleDirectory,
{
    let mut subscription = manager.subscribe()?;
    let Some(event) = subscription.next_event().await else {
        return Err(CliError::NotReady(manager.current().phase().as_str()));
    };
    let session = manager.handle_event(event).await;
    if session.is_ready() {
        Ok(session)
    } else {
        Err(CliError::NotReady(session.phase().as_str()))
    }
}

fn report_session(session: &Session) {
    let uid = session.identity().map_or("", Principal::uid);
    tracing::info!(uid, role = session.role().as_str(), "signed in");
}

async fn list_tasks(tasks: Arc<CliTasks>, config: &ClientConfig) -> Result<(), CliError> {
    let engine = BoardTransitionEngine::new(tasks, Arc::new(DefaultClock), config.task_scope());
    let count = engine.load().await?;
    for task in engine.tasks() {
        tracing::info!(
            task_id = %task.task_id(),
            status = %task.status(),
            priority = task.priority().as_str(),
            title = task.title(),
            "task"
        );
    }
    tracing::info!(count, scope = config.task_scope().as_str(), "tasks listed");
    Ok(())
}

async fn move_task(
    tasks: Arc<CliTasks>,
    config: &ClientConfig,
    task_id: &TaskId,
    target: TaskStatus,
) -> Result<(), CliError> {
    let engine = BoardTransitionEngine::new(tasks, Arc::new(DefaultClock), config.task_scope());
    engine.load().await?;
    let Some(handle) = engine.begin_transition(task_id, target)?.into_handle() else {
        tracing::info!(task_id = %task_id, status = %target, "task already has that status");
        return Ok(());
    };

    match handle.settled().await {
        TransitionOutcome::Confirmed => {
            tracing::info!(task_id = %task_id, status = %target, "task moved");
            Ok(())
        }
        TransitionOutcome::Resynchronized { error } => {
            let current = engine.task(task_id).map(|task| task.status());
            tracing::warn!(
                task_id = %task_id,
                status = ?current,
                "board reloaded after rejected update"
            );
            Err(CliError::TransitionFailed(error.to_string()))
        }
        TransitionOutcome::ResyncFailed {
            error,
            reload_error,
        } => Err(CliError::TransitionFailed(format!(
            "{error}; reload also failed: {reload_error}"
        ))),
        TransitionOutcome::Aborted(reason) => Err(CliError::TransitionFailed(reason)),
    }
}

async fn list_comments(tasks: Arc<CliTasks>, task_id: &TaskId) -> Result<(), CliError> {
    let comments = TaskCommentsService::new(tasks).list(task_id).await?;
    for comment in &comments {
        tracing::info!(
            author = comment.author_name.as_str(),
            at = %comment.timestamp,
            text = comment.text.as_str(),
            "comment"
        );
    }
    tracing::info!(task_id = %task_id, count = comments.len(), "comments listed");
    Ok(())
}
