//! The authenticated user's identity record.

use serde::{Deserialize, Serialize};

/// The authenticated user's minimal public record.
///
/// Exists only while a session is valid: created by a successful
/// `validate()` (the authority re-derives it from the session it issued),
/// cleared by logout or a failed validation. Owned exclusively by
/// [`SessionStore`](crate::store::session::SessionStore); every other
/// component treats it as read-only.
///
/// # Examples
///
/// ```
/// use tasksync::Identity;
///
/// let identity = Identity {
///     id: "u1".to_string(),
///     email: "ada@example.com".to_string(),
/// };
/// let json = serde_json::to_value(&identity).unwrap();
/// assert_eq!(json["id"], "u1");
/// assert_eq!(json["email"], "ada@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Stable user id assigned by the remote authority.
    pub id: String,

    /// The email the user registered with.
    pub email: String,
}
