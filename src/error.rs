//! Error types shared by the remote authority traits and the stores.
//!
//! Provides [`ApiError`], the single error taxonomy for every remote
//! operation, with an HTTP status mapping for the wire-facing variants.
//! Stores catch every failure and surface it as a structured result;
//! nothing in this crate panics on a failed remote call.

use thiserror::Error;

/// Errors surfaced by remote-authority calls and store operations.
///
/// Each variant carries the context a caller needs to present the failure
/// to the user. Use [`http_status`](ApiError::http_status) to map the
/// wire-facing variants to the HTTP status the remote authority would
/// answer with.
///
/// # Examples
///
/// ```
/// use tasksync::ApiError;
///
/// let err = ApiError::NotFound { task_id: "missing".to_string() };
/// assert_eq!(err.http_status(), Some(404));
/// assert!(err.to_string().contains("missing"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Input rejected before any remote call (malformed email, password
    /// length out of bounds).
    #[error("invalid {field}: {reason}")]
    Validation {
        /// The rejected field (`"email"` or `"password"`).
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Signup with an email the authority already knows. Distinct from
    /// [`Validation`](ApiError::Validation): the input was well-formed,
    /// uniqueness is what failed.
    #[error("email already registered")]
    AlreadyRegistered,

    /// Invalid credentials, or an expired/absent session. Also used when a
    /// mutation result arrives for an identity that is no longer current.
    #[error("authentication failed: {reason}")]
    Auth {
        /// Why authentication failed.
        reason: String,
    },

    /// A mutation targeted a task that no longer exists server-side.
    #[error("task not found: {task_id}")]
    NotFound {
        /// The id that was not found.
        task_id: String,
    },

    /// Network failure or malformed response. Carries no HTTP status --
    /// the request never completed.
    #[error("transport failure: {reason}")]
    Transport {
        /// What went wrong below the application layer.
        reason: String,
    },
}

impl ApiError {
    /// Maps the wire-facing variants to the HTTP status the remote
    /// authority answers with.
    ///
    /// - `400`: [`Validation`](ApiError::Validation)
    /// - `401`: [`Auth`](ApiError::Auth)
    /// - `404`: [`NotFound`](ApiError::NotFound)
    /// - `409`: [`AlreadyRegistered`](ApiError::AlreadyRegistered)
    /// - `None`: [`Transport`](ApiError::Transport) -- the failure happened
    ///   below the application protocol.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Auth { .. } => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::AlreadyRegistered => Some(409),
            Self::Transport { .. } => None,
        }
    }

    /// Shorthand for a transport error with the given reason.
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Shorthand for an auth error with the given reason.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }
}
