//! In-process remote authority for tests and local development.
//!
//! [`InMemoryAuthority`] implements both [`SessionAuthority`] and
//! [`TaskAuthority`] against `DashMap`/`IndexMap` tables, so the whole
//! engine can run without a network. It also exposes the knobs the
//! integration suite needs: per-operation call counters, one-shot failure
//! injection, and one-shot response delay.
//!
//! Passwords are stored as salted SHA-256 digests -- never plaintext --
//! but this is **not** the production hashing scheme; the real remote
//! authority owns memory-hard hashing. Never use this type in production.
//!
//! # Examples
//!
//! ```
//! use tasksync::remote::{InMemoryAuthority, SessionAuthority};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let authority = InMemoryAuthority::new().with_user("ada@example.com", "hunter22");
//! authority.login("ada@example.com", "hunter22").await.unwrap();
//! let identity = authority.validate().await.unwrap();
//! assert_eq!(identity.email, "ada@example.com");
//! # });
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;
use crate::types::{Identity, NewTask, Task, TaskStatus};
use crate::validate::validate_credentials;

use super::{SessionAuthority, TaskAuthority};

#[derive(Debug, Clone)]
struct UserRecord {
    id: String,
    email: String,
    salt: String,
    password_digest: String,
}

/// Salted digest; the salt is per-user and random.
fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    BASE64.encode(hasher.finalize())
}

#[derive(Debug, Default)]
struct CallCounters {
    signup: AtomicUsize,
    login: AtomicUsize,
    validate: AtomicUsize,
    logout: AtomicUsize,
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

/// Snapshot of how many times each remote operation was invoked.
///
/// Read it with [`InMemoryAuthority::call_counts`]; the integration suite
/// uses it to prove properties like "rejected input produces no remote
/// call" and "an identity change triggers exactly one list call".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    /// `signup` invocations.
    pub signup: usize,
    /// `login` invocations.
    pub login: usize,
    /// `validate` invocations.
    pub validate: usize,
    /// `logout` invocations.
    pub logout: usize,
    /// `list_tasks` invocations.
    pub list: usize,
    /// `create_task` invocations.
    pub create: usize,
    /// `update_task` invocations.
    pub update: usize,
    /// `delete_task` invocations.
    pub delete: usize,
}

/// In-process implementation of both authority traits.
///
/// One user table keyed by email, one current-session slot (the stand-in
/// for the session cookie), one insertion-ordered task table. All state
/// is behind fine-grained locks so concurrent in-flight operations behave
/// like they would against a real service.
///
/// # Test Knobs
///
/// - [`inject_failure`](Self::inject_failure): the next operation fails
///   with the given error before touching any state (except `logout`,
///   which fails before clearing the remote session -- exactly the
///   silent-failure case the session store must tolerate).
/// - [`delay_next_response`](Self::delay_next_response): the next
///   operation does its work, then sleeps before returning, modeling
///   response latency for overlap tests.
#[derive(Debug, Default)]
pub struct InMemoryAuthority {
    users: DashMap<String, UserRecord>,
    session: Mutex<Option<Identity>>,
    tasks: Mutex<IndexMap<String, Task>>,
    fail_next: Mutex<Option<ApiError>>,
    delay_next: Mutex<Option<Duration>>,
    last_list_owner: Mutex<Option<String>>,
    calls: CallCounters,
}

impl InMemoryAuthority {
    /// Creates an empty authority: no users, no session, no tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user directly, bypassing validation and counters.
    /// Builder-style, for seeding test fixtures.
    pub fn with_user(self, email: &str, password: &str) -> Self {
        let salt = Uuid::new_v4().to_string();
        let record = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_digest: password_digest(&salt, password),
            salt,
        };
        self.users.insert(email.to_string(), record);
        self
    }

    /// Makes the next operation fail with `error` before doing its work.
    pub fn inject_failure(&self, error: ApiError) {
        *self.fail_next.lock() = Some(error);
    }

    /// Makes the next operation sleep for `delay` after doing its work,
    /// before returning its response.
    pub fn delay_next_response(&self, delay: Duration) {
        *self.delay_next.lock() = Some(delay);
    }

    /// Snapshot of the per-operation call counters.
    pub fn call_counts(&self) -> CallCounts {
        CallCounts {
            signup: self.calls.signup.load(Ordering::SeqCst),
            login: self.calls.login.load(Ordering::SeqCst),
            validate: self.calls.validate.load(Ordering::SeqCst),
            logout: self.calls.logout.load(Ordering::SeqCst),
            list: self.calls.list.load(Ordering::SeqCst),
            create: self.calls.create.load(Ordering::SeqCst),
            update: self.calls.update.load(Ordering::SeqCst),
            delete: self.calls.delete.load(Ordering::SeqCst),
        }
    }

    /// The owner id passed to the most recent `list_tasks` call.
    pub fn last_list_owner(&self) -> Option<String> {
        self.last_list_owner.lock().clone()
    }

    /// Number of registered users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// The identity a registered email would validate to, if present.
    pub fn identity_for(&self, email: &str) -> Option<Identity> {
        self.users.get(email).map(|user| Identity {
            id: user.id.clone(),
            email: user.email.clone(),
        })
    }

    fn take_fault(&self) -> Result<(), ApiError> {
        match self.fail_next.lock().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn response_delay(&self) {
        let delay = self.delay_next.lock().take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl SessionAuthority for InMemoryAuthority {
    async fn signup(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.calls.signup.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        // Authoritative re-validation; the client checked first, but the
        // authority does not trust it.
        validate_credentials(email, password)?;

        match self.users.entry(email.to_string()) {
            Entry::Occupied(_) => return Err(ApiError::AlreadyRegistered),
            Entry::Vacant(slot) => {
                let salt = Uuid::new_v4().to_string();
                slot.insert(UserRecord {
                    id: Uuid::new_v4().to_string(),
                    email: email.to_string(),
                    password_digest: password_digest(&salt, password),
                    salt,
                });
            }
        }

        self.response_delay().await;
        Ok(())
    }

    async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        let identity = {
            let user = self
                .users
                .get(email)
                .ok_or_else(|| ApiError::auth("invalid credentials"))?;
            if password_digest(&user.salt, password) != user.password_digest {
                return Err(ApiError::auth("invalid credentials"));
            }
            Identity {
                id: user.id.clone(),
                email: user.email.clone(),
            }
        };
        *self.session.lock() = Some(identity);

        self.response_delay().await;
        Ok(())
    }

    async fn validate(&self) -> Result<Identity, ApiError> {
        self.calls.validate.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        let identity = self
            .session
            .lock()
            .clone()
            .ok_or_else(|| ApiError::auth("not authenticated"))?;

        self.response_delay().await;
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.calls.logout.fetch_add(1, Ordering::SeqCst);
        // An injected failure leaves the remote session alive, which is
        // the silent-failure case callers must tolerate.
        self.take_fault()?;

        *self.session.lock() = None;

        self.response_delay().await;
        Ok(())
    }
}

#[async_trait]
impl TaskAuthority for InMemoryAuthority {
    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, ApiError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        *self.last_list_owner.lock() = Some(owner_id.to_string());
        self.take_fault()?;

        let tasks: Vec<Task> = self
            .tasks
            .lock()
            .values()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect();

        self.response_delay().await;
        Ok(tasks)
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task, ApiError> {
        self.calls.create.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        let task = Task {
            id: Uuid::new_v4().to_string(),
            name: new_task.name,
            priority: new_task.priority,
            status: TaskStatus::InProgress,
            owner_id: new_task.owner_id,
        };
        self.tasks.lock().insert(task.id.clone(), task.clone());

        self.response_delay().await;
        Ok(task)
    }

    async fn update_task(&self, task: Task) -> Result<Task, ApiError> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        {
            let mut tasks = self.tasks.lock();
            let slot = tasks.get_mut(&task.id).ok_or_else(|| ApiError::NotFound {
                task_id: task.id.clone(),
            })?;
            *slot = task.clone();
        }

        self.response_delay().await;
        Ok(task)
    }

    async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.take_fault()?;

        self.tasks
            .lock()
            .shift_remove(task_id)
            .ok_or_else(|| ApiError::NotFound {
                task_id: task_id.to_string(),
            })?;

        self.response_delay().await;
        Ok(())
    }
}
