//! Engine facade: construction and data-flow wiring.
//!
//! [`SyncEngine`] builds the stores around one shared
//! [`EventBus`](crate::event::EventBus) and implements the flow the
//! stores themselves stay ignorant of: an identity change refetches the
//! collection, and a collection change garbage-collects the row tracker.
//!
//! Two ways to drive the flow:
//!
//! - [`run`](SyncEngine::run) -- an event loop that reacts to
//!   [`StoreEvent::IdentityChanged`] from anywhere (login screen, session
//!   expiry, logout).
//! - [`sync_identity`](SyncEngine::sync_identity) /
//!   [`logout_and_clear`](SyncEngine::logout_and_clear) -- explicit
//!   one-shot rounds for callers that do not run the loop.
//!
//! Use one or the other; running the loop *and* calling `sync_identity`
//! will fetch twice on the same identity change.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::constants::DEFAULT_EVENT_CAPACITY;
use crate::controller::RowController;
use crate::event::{EventBus, StoreEvent};
use crate::remote::{SessionAuthority, TaskAuthority};
use crate::store::rows::RowTracker;
use crate::store::session::SessionStore;
use crate::store::tasks::TaskCollection;
use crate::view::TaskListView;

/// Engine construction knobs.
///
/// | Setting          | Default | Description                        |
/// |------------------|---------|------------------------------------|
/// | `event_capacity` | 64      | Event-channel buffer per subscriber |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Capacity of the shared event channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// Owns the stores and wires the data flow between them.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tasksync::{InMemoryAuthority, SyncEngine, TaskPriority};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let authority = Arc::new(InMemoryAuthority::new().with_user("ada@example.com", "hunter22"));
/// let engine = SyncEngine::new(authority.clone(), authority);
///
/// engine.session().login("ada@example.com", "hunter22").await.unwrap();
/// engine.sync_identity().await;
/// assert!(engine.session().identity().is_some());
///
/// engine.controller().create("Water the plants", TaskPriority::Low).await;
/// assert_eq!(engine.view().len(), 1);
/// # });
/// ```
pub struct SyncEngine {
    events: EventBus,
    session: Arc<SessionStore>,
    collection: Arc<TaskCollection>,
    rows: Arc<RowTracker>,
    controller: RowController,
}

impl SyncEngine {
    /// Builds an engine with the default configuration.
    pub fn new(
        session_authority: Arc<dyn SessionAuthority>,
        task_authority: Arc<dyn TaskAuthority>,
    ) -> Self {
        Self::with_config(session_authority, task_authority, EngineConfig::default())
    }

    /// Builds an engine with an explicit configuration.
    pub fn with_config(
        session_authority: Arc<dyn SessionAuthority>,
        task_authority: Arc<dyn TaskAuthority>,
        config: EngineConfig,
    ) -> Self {
        let events = EventBus::new(config.event_capacity);
        let session = Arc::new(SessionStore::new(session_authority, events.clone()));
        let collection = Arc::new(TaskCollection::new(task_authority, events.clone()));
        let rows = Arc::new(RowTracker::new(events.clone()));
        let controller = RowController::new(collection.clone(), rows.clone());
        Self {
            events,
            session,
            collection,
            rows,
            controller,
        }
    }

    /// The session store.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The task collection store.
    pub fn collection(&self) -> &TaskCollection {
        &self.collection
    }

    /// The per-row pending tracker.
    pub fn rows(&self) -> &RowTracker {
        &self.rows
    }

    /// The row mutation controller.
    pub fn controller(&self) -> &RowController {
        &self.controller
    }

    /// Opens a subscription to the shared event bus.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Projects the current store state into renderable rows.
    pub fn view(&self) -> TaskListView {
        TaskListView::project(&self.collection, &self.rows)
    }

    /// One explicit validate-then-fetch round.
    ///
    /// Validates the session, fetches the collection for whatever
    /// identity resulted (clearing it when anonymous), and garbage
    /// collects the row tracker. Returns whether the session is valid.
    /// A failed fetch is logged, not propagated -- the collection stays
    /// on its previous contents and the user can retry.
    pub async fn sync_identity(&self) -> bool {
        let valid = self.session.validate().await;
        let identity = self.session.identity();
        if let Err(error) = self.collection.fetch(identity.as_ref()).await {
            tracing::warn!(%error, "task refetch failed after identity sync");
        }
        self.collect_rows();
        valid
    }

    /// Logs out and clears the collection.
    ///
    /// The identity and collection are cleared even when the remote
    /// logout fails; see
    /// [`SessionStore::logout`](crate::store::session::SessionStore::logout).
    pub async fn logout_and_clear(&self) {
        self.session.logout().await;
        // Clearing never touches the network and never fails.
        let _ = self.collection.fetch(None).await;
        self.collect_rows();
    }

    /// Event loop: reacts to identity changes with a refetch and to
    /// collection changes with row-tracker garbage collection.
    ///
    /// Runs until every sender side of the bus is gone. Subscribe-before-
    /// mutate ordering is handled internally: the receiver is opened
    /// before the first await.
    pub async fn run(&self) {
        let mut events = self.events.subscribe();
        loop {
            match events.recv().await {
                Ok(StoreEvent::IdentityChanged { identity }) => {
                    if let Err(error) = self.collection.fetch(identity.as_ref()).await {
                        tracing::warn!(%error, "task refetch failed after identity change");
                    }
                    self.collect_rows();
                }
                Ok(StoreEvent::CollectionReplaced | StoreEvent::TaskRemoved { .. }) => {
                    self.collect_rows();
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events cannot be replayed; re-sync from the
                    // stores instead.
                    tracing::warn!(skipped, "event loop lagged; re-fetching");
                    let identity = self.session.identity();
                    if let Err(error) = self.collection.fetch(identity.as_ref()).await {
                        tracing::warn!(%error, "task refetch failed after lag");
                    }
                    self.collect_rows();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    /// Drops pending-row entries whose task left the collection.
    fn collect_rows(&self) {
        let live: HashSet<String> = self.collection.task_ids().into_iter().collect();
        self.rows.retain(|task_id| live.contains(task_id));
    }
}
