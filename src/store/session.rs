//! Session store: identity lifecycle and session-level activity.
//!
//! The state machine is `Anonymous -> Authenticated -> Anonymous`:
//! a successful `validate()` (usually right after `login()`) enters
//! `Authenticated`; `logout()` or a failed `validate()` leaves it.
//! `login()` deliberately does not set the identity -- the authority
//! issues the session, and the identity must be re-derived from that
//! session, not from the login response.
//!
//! Every transition-triggering call sets a [`SessionActivity`] for its
//! duration and restores `Idle` on every exit path, so the flag can only
//! stick if the underlying call never settles (a transport-timeout
//! concern owned by the authority implementation).

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::ApiError;
use crate::event::{EventBus, StoreEvent};
use crate::remote::SessionAuthority;
use crate::types::Identity;
use crate::validate::validate_credentials;

/// Which session-level operation is currently in flight.
///
/// The UI only needs "disable the auth inputs while anything is pending",
/// but a tagged state keeps the contract precise: at most one variant at
/// a time, and [`is_busy`](SessionActivity::is_busy) derives the coarse
/// flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionActivity {
    /// Nothing in flight.
    #[default]
    Idle,
    /// `login` in flight.
    LoggingIn,
    /// `signup` in flight.
    SigningUp,
    /// `validate` in flight.
    Validating,
    /// `logout` in flight.
    LoggingOut,
}

impl SessionActivity {
    /// `true` unless [`Idle`](SessionActivity::Idle).
    pub fn is_busy(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

impl fmt::Display for SessionActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::LoggingIn => write!(f, "logging_in"),
            Self::SigningUp => write!(f, "signing_up"),
            Self::Validating => write!(f, "validating"),
            Self::LoggingOut => write!(f, "logging_out"),
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    identity: Option<Identity>,
    activity: SessionActivity,
}

/// Holds the current identity and runs session operations against the
/// remote authority.
///
/// The identity is owned exclusively by this store; other components read
/// it via [`identity`](SessionStore::identity) and are notified of changes
/// through [`StoreEvent::IdentityChanged`].
///
/// No operation here lets a remote failure escape as a panic or an
/// unstructured error: `validate` and `logout` swallow failures by
/// contract, `login` and `signup` return them as [`ApiError`].
pub struct SessionStore {
    authority: Arc<dyn SessionAuthority>,
    state: RwLock<SessionState>,
    events: EventBus,
}

impl SessionStore {
    /// Creates a store in the `Anonymous` state.
    pub fn new(authority: Arc<dyn SessionAuthority>, events: EventBus) -> Self {
        Self {
            authority,
            state: RwLock::new(SessionState::default()),
            events,
        }
    }

    /// The identity of the authenticated user, if any.
    pub fn identity(&self) -> Option<Identity> {
        self.state.read().identity.clone()
    }

    /// The session-level operation currently in flight.
    pub fn activity(&self) -> SessionActivity {
        self.state.read().activity
    }

    /// `true` while any session-level operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.activity().is_busy()
    }

    /// Asks the authority whether a valid session exists.
    ///
    /// On success the identity is stored and `true` is returned. On *any*
    /// failure -- no session, transport error, malformed response -- the
    /// identity is cleared and `false` is returned. Never panics, never
    /// returns an error.
    pub async fn validate(&self) -> bool {
        let _activity = self.enter(SessionActivity::Validating);
        match self.authority.validate().await {
            Ok(identity) => {
                self.set_identity(Some(identity));
                true
            }
            Err(error) => {
                tracing::debug!(%error, "session validation failed; clearing identity");
                self.set_identity(None);
                false
            }
        }
    }

    /// Delegates credential verification to the authority.
    ///
    /// `Ok(())` means the credentials were accepted and a session was
    /// issued -- the identity is *not* populated here. Follow with
    /// [`validate`](SessionStore::validate) to learn who the session
    /// belongs to. On `Err`, the identity is untouched; there is no
    /// optimistic transition to roll back.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Auth`] for rejected credentials.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let _activity = self.enter(SessionActivity::LoggingIn);
        self.authority.login(email, password).await
    }

    /// Registers a new account.
    ///
    /// Credentials are validated client-side first; rejected input returns
    /// [`ApiError::Validation`] without any remote call. The authority
    /// re-validates authoritatively and enforces email uniqueness.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] for malformed input (client- or
    ///   server-side).
    /// - [`ApiError::AlreadyRegistered`] for a duplicate email.
    /// - [`ApiError::Transport`] when the authority is unreachable.
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), ApiError> {
        validate_credentials(email, password)?;
        let _activity = self.enter(SessionActivity::SigningUp);
        self.authority.signup(email, password).await
    }

    /// Invalidates the remote session and clears the identity.
    ///
    /// The identity is cleared even when the remote call fails: local
    /// state must not keep showing a logged-in user whose session is
    /// gone. The failed invalidation is logged and otherwise ignored --
    /// the remote session may outlive us until it expires. Idempotent.
    pub async fn logout(&self) {
        let _activity = self.enter(SessionActivity::LoggingOut);
        if let Err(error) = self.authority.logout().await {
            tracing::warn!(%error, "remote logout failed; clearing local identity anyway");
        }
        self.set_identity(None);
    }

    /// Sets the activity and returns a guard that restores `Idle` on
    /// drop, whatever path the operation exits through.
    fn enter(&self, activity: SessionActivity) -> ActivityGuard<'_> {
        self.set_activity(activity);
        ActivityGuard { store: self }
    }

    fn set_activity(&self, activity: SessionActivity) {
        {
            let mut state = self.state.write();
            if state.activity == activity {
                return;
            }
            state.activity = activity;
        }
        self.events.emit(StoreEvent::ActivityChanged { activity });
    }

    fn set_identity(&self, identity: Option<Identity>) {
        let changed = {
            let mut state = self.state.write();
            if state.identity == identity {
                false
            } else {
                state.identity = identity.clone();
                true
            }
        };
        if changed {
            self.events.emit(StoreEvent::IdentityChanged { identity });
        }
    }
}

struct ActivityGuard<'a> {
    store: &'a SessionStore,
}

impl Drop for ActivityGuard<'_> {
    fn drop(&mut self) {
        self.store.set_activity(SessionActivity::Idle);
    }
}
