//! View reconciliation: renderable rows derived from store state.
//!
//! A pure projection -- it owns nothing and is never a source of truth.
//! Re-derive it whenever the event bus reports a collection mutation or a
//! row pending transition; rows come out in collection (insertion) order.

use crate::store::rows::RowTracker;
use crate::store::tasks::TaskCollection;
use crate::types::{Task, TaskPriority, TaskStatus};

/// What the row's completion control should render as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    /// Interactive checkbox.
    Checkbox {
        /// Checked when the task is completed.
        checked: bool,
    },
    /// Non-interactive progress indicator; shown while the row's mutation
    /// is in flight, which is also what blocks duplicate submissions on
    /// this row without touching any other row.
    Spinner,
}

/// One renderable row: a task plus its ephemeral pending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Task id (row key).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Priority selector value.
    pub priority: TaskPriority,
    /// Completion state.
    pub status: TaskStatus,
    /// `true` while a mutation for this row is outstanding.
    pub pending: bool,
}

impl RowView {
    fn from_task(task: &Task, pending: bool) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            priority: task.priority,
            status: task.status,
            pending,
        }
    }

    /// The completion control for this row.
    pub fn control(&self) -> RowControl {
        if self.pending {
            RowControl::Spinner
        } else {
            RowControl::Checkbox {
                checked: self.status.is_completed(),
            }
        }
    }

    /// Completed rows render dimmed.
    pub fn dimmed(&self) -> bool {
        self.status.is_completed()
    }

    /// The status badge text.
    pub fn status_label(&self) -> String {
        self.status.to_string()
    }
}

/// The full task list as the UI should render it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskListView {
    /// Rows in collection order.
    pub rows: Vec<RowView>,
}

impl TaskListView {
    /// Projects the current store state into renderable rows.
    pub fn project(collection: &TaskCollection, rows: &RowTracker) -> Self {
        Self {
            rows: collection
                .snapshot()
                .iter()
                .map(|task| RowView::from_task(task, rows.is_pending(&task.id)))
                .collect(),
        }
    }

    /// `true` when there is nothing to render but the empty-state screen.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// The row for the given task id, if present.
    pub fn row(&self, task_id: &str) -> Option<&RowView> {
        self.rows.iter().find(|row| row.id == task_id)
    }
}
