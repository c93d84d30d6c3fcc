//! Task collection store.
//!
//! Owns the in-memory task list for the current identity as an
//! insertion-ordered map keyed by task id. A fetch replaces the whole map
//! in one swap -- the collection is never mutated in place while a fetch
//! is in flight, so readers never observe a partially-updated view.
//!
//! # Staleness guards
//!
//! Two guards close the races the async boundary opens:
//!
//! - **Fetch generation**: every fetch bumps a generation counter and
//!   checks it again when the response arrives; a superseded fetch's
//!   response is discarded, so the *last-issued* fetch wins regardless of
//!   resolve order.
//! - **Identity scope**: create/update/delete capture the identity scope
//!   when they start and re-check it when the response arrives; a result
//!   for an identity that is no longer current is discarded instead of
//!   applied.
//!
//! Operations on different task ids are deliberately unserialized -- they
//! touch disjoint entries. Same-id serialization is the
//! [`RowTracker`](crate::store::rows::RowTracker)'s job.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::ApiError;
use crate::event::{EventBus, StoreEvent};
use crate::remote::TaskAuthority;
use crate::types::{Identity, NewTask, Task, TaskPriority};

#[derive(Debug, Default)]
struct CollectionState {
    /// The identity the collection belongs to. `None` means anonymous:
    /// empty collection, no remote calls.
    scope: Option<Identity>,
    tasks: IndexMap<String, Task>,
    /// Bumped by every fetch; responses apply only if still current.
    generation: u64,
}

/// The in-memory task collection for the current identity.
///
/// This store is the single owner of task data: every other component
/// reads snapshots or invokes operations; none holds a mutable reference
/// into the collection. Mutations emit [`StoreEvent`]s so the view layer
/// can redraw affected rows.
pub struct TaskCollection {
    authority: Arc<dyn TaskAuthority>,
    state: RwLock<CollectionState>,
    events: EventBus,
}

impl TaskCollection {
    /// Creates an empty, anonymous collection.
    pub fn new(authority: Arc<dyn TaskAuthority>, events: EventBus) -> Self {
        Self {
            authority,
            state: RwLock::new(CollectionState::default()),
            events,
        }
    }

    /// Snapshot of the collection in insertion order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.state.read().tasks.values().cloned().collect()
    }

    /// The task with the given id, if present.
    pub fn get(&self, task_id: &str) -> Option<Task> {
        self.state.read().tasks.get(task_id).cloned()
    }

    /// Ids currently in the collection, in insertion order.
    pub fn task_ids(&self) -> Vec<String> {
        self.state.read().tasks.keys().cloned().collect()
    }

    /// Number of tasks in the collection.
    pub fn len(&self) -> usize {
        self.state.read().tasks.len()
    }

    /// `true` when the collection holds no tasks.
    pub fn is_empty(&self) -> bool {
        self.state.read().tasks.is_empty()
    }

    /// The identity the collection is currently scoped to.
    pub fn scope(&self) -> Option<Identity> {
        self.state.read().scope.clone()
    }

    /// Replaces the collection with the given identity's tasks.
    ///
    /// `None` clears the collection immediately -- no remote call. `Some`
    /// fetches the owner's tasks and swaps the whole map in, unless a
    /// newer fetch started while this one was in flight, in which case
    /// the response is discarded.
    ///
    /// # Errors
    ///
    /// Whatever the authority returned; the collection is unchanged on
    /// error. A superseded fetch returns `Ok(())` even if it failed --
    /// its outcome no longer matters.
    pub async fn fetch(&self, identity: Option<&Identity>) -> Result<(), ApiError> {
        let Some(identity) = identity else {
            {
                let mut state = self.state.write();
                state.generation += 1;
                state.scope = None;
                state.tasks = IndexMap::new();
            }
            self.events.emit(StoreEvent::CollectionReplaced);
            return Ok(());
        };

        let generation = {
            let mut state = self.state.write();
            state.generation += 1;
            state.scope = Some(identity.clone());
            state.generation
        };

        let result = self.authority.list_tasks(&identity.id).await;

        {
            let mut state = self.state.write();
            if state.generation != generation {
                tracing::debug!(
                    owner_id = %identity.id,
                    "discarding superseded fetch response"
                );
                return Ok(());
            }
            let fetched = result?;
            state.tasks = fetched
                .into_iter()
                .map(|task| (task.id.clone(), task))
                .collect();
        }
        self.events.emit(StoreEvent::CollectionReplaced);
        Ok(())
    }

    /// Creates a task for the current identity and appends the
    /// server-confirmed object (with its assigned id) to the collection.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] when no identity is current, or when the
    ///   identity changed while the call was in flight (the result is
    ///   discarded, not applied).
    /// - Whatever the authority returned; the collection is unchanged on
    ///   error.
    pub async fn create(&self, name: String, priority: TaskPriority) -> Result<Task, ApiError> {
        let scope = self
            .scope()
            .ok_or_else(|| ApiError::auth("no identity to create a task for"))?;

        let task = self
            .authority
            .create_task(NewTask {
                name,
                priority,
                owner_id: scope.id.clone(),
            })
            .await?;

        {
            let mut state = self.state.write();
            if !Self::scope_is(&state, &scope.id) {
                tracing::warn!(
                    task_id = %task.id,
                    owner_id = %scope.id,
                    "discarding create result for a superseded identity"
                );
                return Err(ApiError::auth("session is no longer current"));
            }
            state.tasks.insert(task.id.clone(), task.clone());
        }
        self.events.emit(StoreEvent::TaskAdded {
            task_id: task.id.clone(),
        });
        Ok(task)
    }

    /// Sends the full updated object and, on success, replaces the
    /// matching entry in place (position preserved).
    ///
    /// On failure the collection is untouched, which is what lets callers
    /// skip optimistic rollback entirely: nothing was applied to roll
    /// back.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] when the task no longer exists
    ///   server-side.
    /// - [`ApiError::Auth`] when the identity changed while the call was
    ///   in flight (the confirmed result is discarded).
    /// - [`ApiError::Transport`] when the authority is unreachable.
    pub async fn update(&self, task: Task) -> Result<Task, ApiError> {
        let owner_id = task.owner_id.clone();
        let confirmed = self.authority.update_task(task).await?;

        let applied = {
            let mut state = self.state.write();
            if !Self::scope_is(&state, &owner_id) {
                tracing::warn!(
                    task_id = %confirmed.id,
                    owner_id = %owner_id,
                    "discarding update result for a superseded identity"
                );
                return Err(ApiError::auth("session is no longer current"));
            }
            match state.tasks.get_mut(&confirmed.id) {
                Some(slot) => {
                    *slot = confirmed.clone();
                    true
                }
                None => {
                    // Removed locally while the update was in flight; do
                    // not resurrect it.
                    tracing::debug!(task_id = %confirmed.id, "update target left the collection");
                    false
                }
            }
        };
        if applied {
            self.events.emit(StoreEvent::TaskUpdated {
                task_id: confirmed.id.clone(),
            });
        }
        Ok(confirmed)
    }

    /// Deletes the task with the given id and removes it from the
    /// collection on success.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] when the task no longer exists
    ///   server-side.
    /// - [`ApiError::Auth`] when the identity changed while the call was
    ///   in flight.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    pub async fn delete(&self, task_id: &str) -> Result<(), ApiError> {
        let scope = self
            .scope()
            .ok_or_else(|| ApiError::auth("no identity to delete a task for"))?;

        self.authority.delete_task(task_id).await?;

        let removed = {
            let mut state = self.state.write();
            if !Self::scope_is(&state, &scope.id) {
                tracing::warn!(
                    task_id,
                    owner_id = %scope.id,
                    "discarding delete result for a superseded identity"
                );
                return Err(ApiError::auth("session is no longer current"));
            }
            state.tasks.shift_remove(task_id).is_some()
        };
        if removed {
            self.events.emit(StoreEvent::TaskRemoved {
                task_id: task_id.to_string(),
            });
        }
        Ok(())
    }

    fn scope_is(state: &CollectionState, owner_id: &str) -> bool {
        state
            .scope
            .as_ref()
            .is_some_and(|identity| identity.id == owner_id)
    }
}
