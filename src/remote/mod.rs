//! Remote authority traits.
//!
//! The stores never talk to a transport directly; they call these traits
//! through `Arc<dyn ...>`. The real implementations wrap HTTP endpoints
//! (`POST /signup`, `GET /session/validate`, the task CRUD routes) and a
//! session provider that owns the cookie mechanics -- all of which are
//! collaborators outside this crate. [`memory::InMemoryAuthority`]
//! implements both traits in-process for tests and local development.
//!
//! # Thread Safety
//!
//! Implementations must be `Send + Sync`; the stores share them across
//! concurrent in-flight operations.

pub mod memory;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{Identity, NewTask, Task};

pub use memory::InMemoryAuthority;

/// Session operations of the remote authority.
///
/// `login` and `logout` are idempotent from the caller's perspective.
/// Credential verification and session issuance both live behind this
/// seam: a successful `login` means "credentials accepted and a session
/// was issued", but the identity is only learned through
/// [`validate`](SessionAuthority::validate), which re-derives it from the
/// issued session.
#[async_trait]
pub trait SessionAuthority: Send + Sync {
    /// Registers a new user.
    ///
    /// The authority re-validates the credentials authoritatively and
    /// enforces email uniqueness. Never stores or logs the plaintext
    /// password.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] for malformed input.
    /// - [`ApiError::AlreadyRegistered`] for a duplicate email.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn signup(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Verifies credentials and issues a session.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] for unknown email or wrong password (the two
    ///   are indistinguishable by design).
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError>;

    /// Returns the identity bound to the current session, if any.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] when no valid session exists.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn validate(&self) -> Result<Identity, ApiError>;

    /// Invalidates the current session. Succeeds when there is nothing to
    /// invalidate.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn logout(&self) -> Result<(), ApiError>;
}

/// Task CRUD operations of the remote authority.
#[async_trait]
pub trait TaskAuthority: Send + Sync {
    /// Returns every task owned by `owner_id`, in the authority's
    /// insertion order.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, ApiError>;

    /// Persists a new task and returns it with the assigned id.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn create_task(&self, new_task: NewTask) -> Result<Task, ApiError>;

    /// Replaces the stored task with the given full object, matched by id.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] when no task with that id exists.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn update_task(&self, task: Task) -> Result<Task, ApiError>;

    /// Deletes the task with the given id.
    ///
    /// # Errors
    ///
    /// - [`ApiError::NotFound`] when no task with that id exists.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    async fn delete_task(&self, task_id: &str) -> Result<(), ApiError>;
}
