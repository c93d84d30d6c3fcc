//! The cooperating client-side stores.
//!
//! # Architecture
//!
//! Three layers share one [`EventBus`](crate::event::EventBus):
//!
//! 1. **[`SessionStore`]** -- owns the [`Identity`](crate::types::Identity)
//!    and the session-level activity flag; every other component reads
//!    identity through it.
//! 2. **[`TaskCollection`]** -- owns the insertion-ordered task map for
//!    the current identity; the only component allowed to mutate it.
//! 3. **[`RowTracker`]** -- owns the ephemeral per-row pending flags that
//!    drive spinners and suppress duplicate submissions.
//!
//! Identity changes flow downward (a new identity invalidates the
//! collection, which invalidates pending rows); nothing flows back up.
//! The [`SyncEngine`](crate::engine::SyncEngine) wires the downward flow.

pub mod rows;
pub mod session;
pub mod tasks;

pub use rows::{RowGuard, RowTracker};
pub use session::{SessionActivity, SessionStore};
pub use tasks::TaskCollection;
