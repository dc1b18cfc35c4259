//! Optimistic status transitions over the cached task board.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use mockable::Clock;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::board::{
    domain::{BoardError, PendingTransition, Task, TaskId, TaskScope, TaskStatus},
    ports::TaskBackend,
};
use crate::gateway::domain::ApiError;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// How a started transition was settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The backend accepted the change; the cache already matched.
    Confirmed,
    /// The backend rejected the change and the board was reloaded.
    Resynchronized {
        /// Why the status update failed.
        error: ApiError,
    },
    /// The backend rejected the change and the reload failed as well, so
    /// the cache still shows the optimistic status.
    ResyncFailed {
        /// Why the status update failed.
        error: ApiError,
        /// Why the reload failed.
        reload_error: BoardError,
    },
    /// The settlement task was cancelled or panicked.
    Aborted(String),
}

/// Background settlement of a started transition.
#[derive(Debug)]
pub struct TransitionHandle {
    generation: u64,
    join: JoinHandle<TransitionOutcome>,
}

impl TransitionHandle {
    /// Returns the generation of the pending record this handle settles.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits until the backend call and any resynchronisation finish.
    pub async fn settled(self) -> TransitionOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) => TransitionOutcome::Aborted(err.to_string()),
        }
    }
}

/// Result of [`BoardTransitionEngine::begin_transition`].
#[derive(Debug)]
pub enum TransitionStart {
    /// The task already had the requested status; nothing was sent.
    Unchanged,
    /// The cache was updated and the backend call is in flight.
    Started(TransitionHandle),
}

impl TransitionStart {
    /// Returns `true` when a backend call was issued.
    #[must_use]
    pub const fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }

    /// Returns the settlement handle, if a call was issued.
    #[must_use]
    pub fn into_handle(self) -> Option<TransitionHandle> {
        match self {
            Self::Unchanged => None,
            Self::Started(handle) => Some(handle),
        }
    }
}

#[derive(Debug, Default)]
struct BoardState {
    tasks: Vec<Task>,
    pending: HashMap<TaskId, PendingTransition>,
    last_generation: u64,
}

impl BoardState {
    /// Swaps in a fresh listing and re-applies in-flight targets.
    ///
    /// Returns how many cached tasks were given their pending status.
    fn replace_tasks(&mut self, tasks: Vec<Task>) -> usize {
        self.tasks = tasks;
        let mut reapplied = 0;
        for pending in self.pending.values() {
            if let Some(task) = self
                .tasks
                .iter_mut()
                .find(|task| task.task_id() == pending.task_id())
            {
                task.set_status(pending.target_status());
                reapplied += 1;
            }
        }
        reapplied
    }
}

/// Owner of the board's task cache.
///
/// Cloning yields another handle onto the same cache. The lock guarding
/// the cache is never held across an `.await`, so every change between
/// network round-trips is applied atomically.
pub struct BoardTransitionEngine<B, C>
where
    B: TaskBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    backend: Arc<B>,
    clock: Arc<C>,
    scope: TaskScope,
    state: Arc<Mutex<BoardState>>,
}

impl<B, C> Clone for BoardTransitionEngine<B, C>
where
    B: TaskBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            clock: Arc::clone(&self.clock),
            scope: self.scope,
            state: Arc::clone(&self.state),
        }
    }
}

impl<B, C> BoardTransitionEngine<B, C>
where
    B: TaskBackend + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates an engine with an empty cache.
    #[must_use]
    pub fn new(backend: Arc<B>, clock: Arc<C>, scope: TaskScope) -> Self {
        Self {
            backend,
            clock,
            scope,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    /// Returns the listing this engine loads.
    #[must_use]
    pub const fn scope(&self) -> TaskScope {
        self.scope
    }

    /// Replaces the cache with the backend's current task set.
    ///
    /// Tasks with a transition still in flight keep its target status, so
    /// a reload triggered by one failed update never hides another update
    /// that is yet to be confirmed. Returns the number of tasks loaded.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Fetch`] when the listing fails. The previous
    /// cache is kept.
    pub async fn load(&self) -> BoardResult<usize> {
        match self.backend.list_tasks(self.scope).await {
            Ok(tasks) => {
                let count = tasks.len();
                let reapplied = self.state().replace_tasks(tasks);
                tracing::debug!(
                    scope = self.scope.as_str(),
                    count,
                    reapplied,
                    "board loaded"
                );
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(
                    scope = self.scope.as_str(),
                    error = %err,
                    "task fetch failed; keeping cached board"
                );
                Err(BoardError::Fetch(err))
            }
        }
    }

    /// Moves a task to `target` optimistically.
    ///
    /// The cached status changes before this returns; the backend call runs
    /// on the Tokio runtime and is settled through the returned handle.
    /// Requesting the current status is a no-op. A transition on a task
    /// that already has one in flight issues a second call and replaces the
    /// pending record.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownTask`] when the task is not cached and
    /// [`BoardError::NoRuntime`] when called outside a Tokio runtime. The
    /// cache is left untouched in both cases.
    pub fn begin_transition(
        &self,
        task_id: &TaskId,
        target: TaskStatus,
    ) -> BoardResult<TransitionStart> {
        let runtime = Handle::try_current().map_err(|_| BoardError::NoRuntime)?;
        let pending = {
            let mut guard = self.state();
            let state = &mut *guard;
            let task = state
                .tasks
                .iter_mut()
                .find(|task| task.task_id() == task_id)
                .ok_or_else(|| BoardError::UnknownTask(task_id.clone()))?;

            let previous = task.status();
            if previous == target {
                return Ok(TransitionStart::Unchanged);
            }

            state.last_generation += 1;
            let pending = PendingTransition::new(
                task_id.clone(),
                previous,
                target,
                self.clock.utc(),
                state.last_generation,
            );
            task.set_status(target);
            if let Some(superseded) = state.pending.insert(task_id.clone(), pending.clone()) {
                tracing::debug!(
                    task_id = %task_id,
                    superseded = superseded.generation(),
                    "replacing in-flight transition"
                );
            }
            pending
        };

        tracing::debug!(
            task_id = %task_id,
            from = %pending.previous_status(),
            to = %pending.target_status(),
            generation = pending.generation(),
            "transition started"
        );

        let generation = pending.generation();
        let engine = self.clone();
        let join = runtime.spawn(async move { engine.settle(pending).await });
        Ok(TransitionStart::Started(TransitionHandle { generation, join }))
    }

    /// Returns a snapshot of the cached tasks.
    #[must_use]
    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.clone()
    }

    /// Returns a snapshot of one cached task.
    #[must_use]
    pub fn task(&self, task_id: &TaskId) -> Option<Task> {
        self.state()
            .tasks
            .iter()
            .find(|task| task.task_id() == task_id)
            .cloned()
    }

    /// Returns the in-flight transitions, oldest first.
    #[must_use]
    pub fn pending(&self) -> Vec<PendingTransition> {
        let mut pending: Vec<_> = self.state().pending.values().cloned().collect();
        pending.sort_by_key(PendingTransition::generation);
        pending
    }

    /// Returns the in-flight transition for a task, if any.
    #[must_use]
    pub fn pending_for(&self, task_id: &TaskId) -> Option<PendingTransition> {
        self.state().pending.get(task_id).cloned()
    }

    async fn settle(&self, pending: PendingTransition) -> TransitionOutcome {
        let result = self
            .backend
            .update_status(pending.task_id(), pending.target_status())
            .await;
        self.clear_pending(&pending);

        let error = match result {
            Ok(_) => {
                tracing::debug!(
                    task_id = %pending.task_id(),
                    status = %pending.target_status(),
                    "transition confirmed"
                );
                return TransitionOutcome::Confirmed;
            }
            Err(error) => error,
        };

        tracing::warn!(
            task_id = %pending.task_id(),
            status = %pending.target_status(),
            error = %error,
            "status update rejected; resynchronising board"
        );
        match self.load().await {
            Ok(_) => TransitionOutcome::Resynchronized { error },
            Err(reload_error) => TransitionOutcome::ResyncFailed {
                error,
                reload_error,
            },
        }
    }

    fn clear_pending(&self, settled: &PendingTransition) {
        let mut state = self.state();
        let is_current = state
            .pending
            .get(settled.task_id())
            .is_some_and(|pending| pending.generation() == settled.generation());
        if is_current {
            state.pending.remove(settled.task_id());
        }
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        // No code panics while holding the lock, so a poisoned cache is
        // still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
