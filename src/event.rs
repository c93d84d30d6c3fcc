//! Store mutation events and the subscription bus.
//!
//! Every store mutation fires a [`StoreEvent`] on a shared [`EventBus`].
//! The view layer (and the [`SyncEngine`](crate::engine::SyncEngine)
//! bridge) subscribe and re-derive what they need; no component re-renders
//! by polling. This replaces framework-reactive re-rendering with explicit
//! observer notifications, so the reconciliation layer is decoupled from
//! any particular rendering technology.

use tokio::sync::broadcast;

use crate::constants::DEFAULT_EVENT_CAPACITY;
use crate::store::session::SessionActivity;
use crate::types::Identity;

/// A notification that some store state changed.
///
/// Granular enough for a renderer to redraw only affected rows: collection
/// events carry the task id, row events carry the id whose pending flag
/// flipped, session events carry the new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// The session identity changed (login/validate/logout). Carries the
    /// new value; `None` means the session ended.
    IdentityChanged {
        /// The identity now held by the session store.
        identity: Option<Identity>,
    },

    /// The session store entered or left a session-level operation.
    ActivityChanged {
        /// The activity now in progress.
        activity: SessionActivity,
    },

    /// The whole task collection was replaced (fetch or clear).
    CollectionReplaced,

    /// A task was appended to the collection.
    TaskAdded {
        /// Id of the appended task.
        task_id: String,
    },

    /// A task was replaced in place.
    TaskUpdated {
        /// Id of the replaced task.
        task_id: String,
    },

    /// A task was removed from the collection.
    TaskRemoved {
        /// Id of the removed task.
        task_id: String,
    },

    /// A row mutation started; the row's control should show a spinner.
    RowPending {
        /// Id of the row now pending.
        task_id: String,
    },

    /// A row mutation settled (success or failure); the row's control is
    /// interactive again.
    RowSettled {
        /// Id of the row no longer pending.
        task_id: String,
    },
}

/// Broadcast fan-out for [`StoreEvent`]s.
///
/// Cloning the bus is cheap and every clone feeds the same subscribers.
/// Emitting with no subscribers is a no-op, so stores can fire
/// unconditionally. Subscribers that fall behind the channel capacity see
/// a `Lagged` error and should re-project from the stores instead of
/// replaying what they missed.
///
/// # Examples
///
/// ```
/// use tasksync::{EventBus, StoreEvent};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.emit(StoreEvent::CollectionReplaced);
/// assert_eq!(rx.recv().await.unwrap(), StoreEvent::CollectionReplaced);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<StoreEvent>,
}

impl EventBus {
    /// Creates a bus whose channel buffers up to `capacity` events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Opens a new subscription. Only events emitted after this call are
    /// delivered.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Fires an event to all current subscribers.
    pub fn emit(&self, event: StoreEvent) {
        // send() errs only when there are no subscribers; that is fine.
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_to_every_subscriber() {
        let bus = EventBus::default();
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        bus.emit(StoreEvent::TaskAdded {
            task_id: "t1".to_string(),
        });

        let expected = StoreEvent::TaskAdded {
            task_id: "t1".to_string(),
        };
        assert_eq!(a.recv().await.unwrap(), expected);
        assert_eq!(b.recv().await.unwrap(), expected);
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_a_noop() {
        let bus = EventBus::new(4);
        bus.emit(StoreEvent::CollectionReplaced);
        // A subscription opened afterwards sees nothing.
        let mut rx = bus.subscribe();
        bus.emit(StoreEvent::CollectionReplaced);
        assert_eq!(rx.recv().await.unwrap(), StoreEvent::CollectionReplaced);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = EventBus::default();
        let clone = bus.clone();
        let mut rx = bus.subscribe();
        clone.emit(StoreEvent::RowSettled {
            task_id: "t".to_string(),
        });
        assert!(rx.try_recv().is_ok());
    }
}
