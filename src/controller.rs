//! Row mutation controller.
//!
//! Wraps every per-row edit in the same three-phase protocol: mark the
//! row pending, invoke the collection operation, and on a non-success
//! result record a user-facing [`Notice`]. The pending flag is cleared by
//! the [`RowGuard`](crate::store::rows::RowGuard)'s drop on every exit
//! path. Failed mutations are never retried automatically -- the user
//! re-triggers the action.
//!
//! Edits here are pessimistic: the collection changes only after the
//! authority confirms, so a failure needs no rollback. The only
//! "optimistic" part is the spinner.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::store::rows::RowTracker;
use crate::store::tasks::TaskCollection;
use crate::types::{Task, TaskPriority};

/// How a requested mutation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The authority confirmed and the collection was updated.
    Applied,
    /// The authority (or a staleness guard) refused; a [`Notice`] was
    /// recorded and the collection is unchanged.
    Rejected,
    /// A mutation for this row was already in flight; the duplicate was
    /// dropped without any remote call.
    Ignored,
}

impl MutationOutcome {
    /// `true` for [`Applied`](MutationOutcome::Applied).
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A user-facing failure notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// What to tell the user.
    pub message: String,
}

/// Runs per-row mutations against the collection with pending-state
/// bookkeeping and failure notices.
pub struct RowController {
    collection: Arc<TaskCollection>,
    rows: Arc<RowTracker>,
    notices: Mutex<Vec<Notice>>,
}

impl RowController {
    /// Creates a controller over the given collection and row tracker.
    pub fn new(collection: Arc<TaskCollection>, rows: Arc<RowTracker>) -> Self {
        Self {
            collection,
            rows,
            notices: Mutex::new(Vec::new()),
        }
    }

    /// Flips the task's completion state.
    ///
    /// The row is pending for the duration; a second toggle while the
    /// first is in flight returns
    /// [`Ignored`](MutationOutcome::Ignored) without a remote call.
    pub async fn toggle_completion(&self, task: &Task) -> MutationOutcome {
        let Some(_guard) = self.rows.begin(&task.id) else {
            return MutationOutcome::Ignored;
        };
        let mut updated = task.clone();
        updated.status = task.status.toggled();
        self.apply_update(updated).await
    }

    /// Moves the task to a different priority bucket.
    pub async fn set_priority(&self, task: &Task, priority: TaskPriority) -> MutationOutcome {
        let Some(_guard) = self.rows.begin(&task.id) else {
            return MutationOutcome::Ignored;
        };
        let mut updated = task.clone();
        updated.priority = priority;
        self.apply_update(updated).await
    }

    /// Renames the task.
    pub async fn rename(&self, task: &Task, name: impl Into<String>) -> MutationOutcome {
        let Some(_guard) = self.rows.begin(&task.id) else {
            return MutationOutcome::Ignored;
        };
        let mut updated = task.clone();
        updated.name = name.into();
        self.apply_update(updated).await
    }

    /// Deletes the task.
    pub async fn delete(&self, task: &Task) -> MutationOutcome {
        let Some(_guard) = self.rows.begin(&task.id) else {
            return MutationOutcome::Ignored;
        };
        match self.collection.delete(&task.id).await {
            Ok(()) => MutationOutcome::Applied,
            Err(error) => {
                self.record(format!("could not delete \"{}\": {error}", task.name));
                MutationOutcome::Rejected
            }
        }
    }

    /// Creates a task for the current identity.
    ///
    /// Collection-level, not row-level: there is no row to mark pending
    /// until the authority assigns an id.
    pub async fn create(&self, name: &str, priority: TaskPriority) -> MutationOutcome {
        match self.collection.create(name.to_string(), priority).await {
            Ok(_) => MutationOutcome::Applied,
            Err(error) => {
                self.record(format!("could not add \"{name}\": {error}"));
                MutationOutcome::Rejected
            }
        }
    }

    /// Notices recorded so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    /// Removes and returns all recorded notices (the UI toasts them
    /// once).
    pub fn drain_notices(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock())
    }

    async fn apply_update(&self, updated: Task) -> MutationOutcome {
        let name = updated.name.clone();
        match self.collection.update(updated).await {
            Ok(_) => MutationOutcome::Applied,
            Err(error) => {
                self.record(format!("could not update \"{name}\": {error}"));
                MutationOutcome::Rejected
            }
        }
    }

    fn record(&self, message: String) {
        tracing::debug!(%message, "row mutation failed");
        self.notices.lock().push(Notice { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_predicates() {
        assert!(MutationOutcome::Applied.is_applied());
        assert!(!MutationOutcome::Rejected.is_applied());
        assert!(!MutationOutcome::Ignored.is_applied());
    }
}
