//! Task entity and its enums.
//!
//! [`Task`] is the full entity as the remote authority stores it; updates
//! send the whole object back (full replace, not a partial patch).
//! [`NewTask`] is the creation payload -- the authority assigns the id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Completion state of a task.
///
/// Two states only; the completion checkbox toggles between them via
/// [`toggled`](TaskStatus::toggled).
///
/// # Examples
///
/// ```
/// use tasksync::TaskStatus;
///
/// assert_eq!(TaskStatus::InProgress.toggled(), TaskStatus::Completed);
/// assert_eq!(TaskStatus::Completed.toggled(), TaskStatus::InProgress);
/// assert_eq!(serde_json::to_value(TaskStatus::InProgress).unwrap(), "in_progress");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is still open.
    InProgress,
    /// Task has been checked off.
    Completed,
}

impl TaskStatus {
    /// Returns `true` for [`Completed`](TaskStatus::Completed).
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns the opposite state (checkbox semantics).
    pub fn toggled(&self) -> Self {
        match self {
            Self::InProgress => Self::Completed,
            Self::Completed => Self::InProgress,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Priority of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    Medium,
    /// Do this first.
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A task as the remote authority stores it.
///
/// `owner_id` always equals the identity that fetched the task; the whole
/// collection is discarded and refetched whenever the identity changes.
/// Updates replace the full object -- there is no partial patch.
///
/// # Examples
///
/// ```
/// use tasksync::{Task, TaskPriority, TaskStatus};
///
/// let task = Task {
///     id: "t1".to_string(),
///     name: "Water the plants".to_string(),
///     priority: TaskPriority::Low,
///     status: TaskStatus::InProgress,
///     owner_id: "u1".to_string(),
/// };
/// let json = serde_json::to_value(&task).unwrap();
/// assert_eq!(json["ownerId"], "u1");
/// assert_eq!(json["status"], "in_progress");
/// assert_eq!(json["priority"], "low");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique id assigned by the remote authority at creation.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Priority bucket.
    pub priority: TaskPriority,

    /// Completion state.
    pub status: TaskStatus,

    /// Id of the identity that owns this task.
    pub owner_id: String,
}

/// Payload for creating a task. The authority assigns the id and echoes
/// the confirmed [`Task`] back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    /// Display name.
    pub name: String,

    /// Priority bucket. New tasks start in
    /// [`TaskStatus::InProgress`].
    pub priority: TaskPriority,

    /// Id of the identity creating the task.
    pub owner_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task {
            id: "task-1".to_string(),
            name: "Write report".to_string(),
            priority: TaskPriority::High,
            status: TaskStatus::InProgress,
            owner_id: "u1".to_string(),
        }
    }

    #[test]
    fn status_display_matches_serde() {
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            "in_progress"
        );
        assert_eq!(
            serde_json::to_value(TaskStatus::Completed).unwrap(),
            "completed"
        );
    }

    #[test]
    fn priority_serializes_snake_case() {
        assert_eq!(serde_json::to_value(TaskPriority::Low).unwrap(), "low");
        assert_eq!(serde_json::to_value(TaskPriority::Medium).unwrap(), "medium");
        assert_eq!(serde_json::to_value(TaskPriority::High).unwrap(), "high");
    }

    #[test]
    fn toggled_is_involutive() {
        for status in [TaskStatus::InProgress, TaskStatus::Completed] {
            assert_ne!(status.toggled(), status);
            assert_eq!(status.toggled().toggled(), status);
        }
    }

    #[test]
    fn task_serializes_camel_case() {
        let json = serde_json::to_value(sample_task()).unwrap();
        assert_eq!(json["id"], "task-1");
        assert_eq!(json["ownerId"], "u1");
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn task_round_trip() {
        let task = sample_task();
        let json = serde_json::to_string(&task).unwrap();
        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn task_deserializes_wire_shape() {
        let task: Task = serde_json::from_str(
            r#"{
                "id": "abc",
                "name": "Buy milk",
                "priority": "medium",
                "status": "completed",
                "ownerId": "u7"
            }"#,
        )
        .unwrap();
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.status.is_completed());
        assert_eq!(task.owner_id, "u7");
    }
}
