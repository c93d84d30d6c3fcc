//! Validation bounds and engine defaults.
//!
//! The credential bounds mirror what the remote authority enforces
//! server-side; the client checks them first so malformed input never
//! produces a remote call.

/// Minimum accepted email length, in characters.
pub const EMAIL_MIN_LEN: usize = 3;

/// Maximum accepted email length, in characters.
pub const EMAIL_MAX_LEN: usize = 255;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Maximum accepted password length, in characters.
pub const PASSWORD_MAX_LEN: usize = 255;

/// Default capacity of the store event channel.
///
/// A UI event loop drains events promptly; 64 gives slack for bursts
/// (a full refetch emits one event per replaced collection, not per row).
pub const DEFAULT_EVENT_CAPACITY: usize = 64;
