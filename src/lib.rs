//! Client-side state synchronization engine for a personal task list.
//!
//! This crate is the pair of cooperating stores behind a task-manager UI:
//! a session store that owns the authenticated identity, and a task
//! collection store that keeps an in-memory task list consistent with a
//! remote authority while per-row asynchronous mutations run with
//! independent loading state. Mutations are pessimistic (confirmed, then
//! applied), so a failed remote call needs no rollback; the only
//! optimistic part is the per-row spinner.
//!
//! # Overview
//!
//! Identity changes flow downward: a new identity replaces the whole
//! collection, an ended session clears it without a remote call, and
//! rows whose task left the collection lose their pending state. Every
//! store mutation fires a [`StoreEvent`] so the view layer re-derives
//! only what changed, with no reactive framework underneath.
//!
//! # Module Organization
//!
//! - [`types`] - Wire types (`Identity`, `Task`, enums)
//! - [`error`] - The [`ApiError`] taxonomy with HTTP status mapping
//! - [`remote`] - Authority traits and the in-process implementation
//! - [`store`] - Session store, task collection, per-row pending tracker
//! - [`controller`] - Three-phase row mutation protocol and notices
//! - [`view`] - Pure projection of store state into renderable rows
//! - [`engine`] - Construction and identity-change wiring
//! - [`event`] - Store events and the subscription bus
//! - [`validate`] - Client-side credential validation
//! - [`constants`] - Validation bounds and defaults
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tasksync::{InMemoryAuthority, SyncEngine, TaskPriority, TaskStatus};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let authority = Arc::new(InMemoryAuthority::new());
//! let engine = SyncEngine::new(authority.clone(), authority);
//!
//! // Register, sign in, and derive the identity from the session.
//! engine.session().signup("ada@example.com", "hunter22").await.unwrap();
//! engine.session().login("ada@example.com", "hunter22").await.unwrap();
//! engine.sync_identity().await;
//!
//! // Add a task and toggle it through the controller.
//! engine.controller().create("Water the plants", TaskPriority::Low).await;
//! let task = engine.collection().snapshot().remove(0);
//! engine.controller().toggle_completion(&task).await;
//!
//! let view = engine.view();
//! assert_eq!(view.rows[0].status, TaskStatus::Completed);
//! # });
//! ```

pub mod constants;
pub mod controller;
pub mod engine;
pub mod error;
pub mod event;
pub mod remote;
pub mod store;
pub mod types;
pub mod validate;
pub mod view;

// Re-exports for ergonomic access
pub use controller::{MutationOutcome, Notice, RowController};
pub use engine::{EngineConfig, SyncEngine};
pub use error::ApiError;
pub use event::{EventBus, StoreEvent};
pub use remote::{InMemoryAuthority, SessionAuthority, TaskAuthority};
pub use store::{RowGuard, RowTracker, SessionActivity, SessionStore, TaskCollection};
pub use types::{Identity, NewTask, Task, TaskPriority, TaskStatus};
pub use view::{RowControl, RowView, TaskListView};
