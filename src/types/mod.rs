//! Wire types shared between the stores and the remote authority.
//!
//! - [`Identity`] -- the authenticated user's minimal public record.
//! - [`Task`], [`NewTask`] -- the task entity and its creation payload.
//! - [`TaskStatus`], [`TaskPriority`] -- task enums with `snake_case`
//!   wire values.
//!
//! All structs serialize with `camelCase` field names to match the remote
//! authority's JSON.

pub mod identity;
pub mod task;

pub use identity::Identity;
pub use task::{NewTask, Task, TaskPriority, TaskStatus};
