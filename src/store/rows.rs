//! Per-row mutation state.
//!
//! [`RowTracker`] keeps one ephemeral `pending` flag per task id -- never
//! a collection-wide "something is loading" flag -- so each row's control
//! can show its own spinner while every other row stays interactive.
//!
//! The tracker is also where the same-id mutation race is closed:
//! [`begin`](RowTracker::begin) hands out at most one [`RowGuard`] per id
//! at a time, and a second attempt while the first is outstanding is
//! refused. Callers treat a refusal as a swallowed duplicate submission.
//!
//! The pending flag is cleared by the guard's `Drop`, so it cannot leak
//! on any exit path, including a panic unwinding through the mutation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::event::{EventBus, StoreEvent};

/// Tracks which task ids have a mutation outstanding.
pub struct RowTracker {
    pending: DashMap<String, ()>,
    events: EventBus,
}

impl RowTracker {
    /// Creates a tracker with no pending rows.
    pub fn new(events: EventBus) -> Self {
        Self {
            pending: DashMap::new(),
            events,
        }
    }

    /// Marks `task_id` pending and returns the guard that will clear it.
    ///
    /// Returns `None` when a mutation for that id is already outstanding;
    /// the caller should drop the duplicate request on the floor. Emits
    /// [`StoreEvent::RowPending`] on success.
    pub fn begin(&self, task_id: &str) -> Option<RowGuard<'_>> {
        match self.pending.entry(task_id.to_string()) {
            Entry::Occupied(_) => return None,
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        self.events.emit(StoreEvent::RowPending {
            task_id: task_id.to_string(),
        });
        Some(RowGuard {
            tracker: self,
            task_id: task_id.to_string(),
        })
    }

    /// `true` while a mutation for `task_id` is outstanding.
    pub fn is_pending(&self, task_id: &str) -> bool {
        self.pending.contains_key(task_id)
    }

    /// Ids with an outstanding mutation.
    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Drops pending entries whose id is not accepted by `live`.
    ///
    /// Called after the collection is replaced or a task is removed, so
    /// the side table never outgrows the collection it shadows.
    pub fn retain(&self, live: impl Fn(&str) -> bool) {
        self.pending.retain(|task_id, _| live(task_id));
    }
}

/// Clears its row's pending flag when dropped.
///
/// Hold it across the mutation's await point; success, failure, and
/// unwind all run the same cleanup.
pub struct RowGuard<'a> {
    tracker: &'a RowTracker,
    task_id: String,
}

impl Drop for RowGuard<'_> {
    fn drop(&mut self) {
        // The entry may already be gone if the task left the collection
        // mid-flight and was garbage collected; only report a settle for
        // rows we actually cleared.
        if self.tracker.pending.remove(&self.task_id).is_some() {
            self.tracker.events.emit(StoreEvent::RowSettled {
                task_id: self.task_id.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventBus;

    fn tracker() -> RowTracker {
        RowTracker::new(EventBus::default())
    }

    #[test]
    fn begin_marks_pending_and_drop_clears() {
        let tracker = tracker();
        {
            let _guard = tracker.begin("a").expect("row was idle");
            assert!(tracker.is_pending("a"));
        }
        assert!(!tracker.is_pending("a"));
    }

    #[test]
    fn second_begin_for_same_id_is_refused() {
        let tracker = tracker();
        let _guard = tracker.begin("a").expect("row was idle");
        assert!(tracker.begin("a").is_none());
        // A different id is unaffected.
        assert!(tracker.begin("b").is_some());
    }

    #[test]
    fn id_is_reusable_after_guard_drops() {
        let tracker = tracker();
        drop(tracker.begin("a"));
        assert!(tracker.begin("a").is_some());
    }

    #[test]
    fn retain_collects_rows_that_left_the_collection() {
        let tracker = tracker();
        let guard = tracker.begin("gone").expect("row was idle");
        tracker.retain(|id| id != "gone");
        assert!(!tracker.is_pending("gone"));
        // The stale guard's drop is a no-op, not a panic or double event.
        drop(guard);
    }

    #[tokio::test]
    async fn pending_transitions_emit_events() {
        let bus = EventBus::default();
        let tracker = RowTracker::new(bus.clone());
        let mut rx = bus.subscribe();

        drop(tracker.begin("a"));

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::RowPending {
                task_id: "a".to_string()
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::RowSettled {
                task_id: "a".to_string()
            }
        );
    }

    #[tokio::test]
    async fn garbage_collected_row_does_not_emit_settled_twice() {
        let bus = EventBus::default();
        let tracker = RowTracker::new(bus.clone());
        let mut rx = bus.subscribe();

        let guard = tracker.begin("a");
        tracker.retain(|_| false);
        drop(guard);

        assert_eq!(
            rx.recv().await.unwrap(),
            StoreEvent::RowPending {
                task_id: "a".to_string()
            }
        );
        assert!(rx.try_recv().is_err(), "no settle event for a GC'd row");
    }
}
