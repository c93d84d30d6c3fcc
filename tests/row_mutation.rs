//! Integration tests for the row mutation protocol: pending round trips,
//! duplicate suppression, per-row independence, and the view projection.

use std::sync::Arc;
use std::time::Duration;

use tasksync::remote::InMemoryAuthority;
use tasksync::{
    ApiError, MutationOutcome, RowControl, StoreEvent, SyncEngine, Task, TaskPriority, TaskStatus,
};

const EMAIL: &str = "ada@example.com";
const PASSWORD: &str = "correct-horse";

/// Signed-in engine with `names.len()` tasks already in the collection.
async fn engine_with_tasks(names: &[&str]) -> (Arc<SyncEngine>, Arc<InMemoryAuthority>, Vec<Task>) {
    let authority = Arc::new(InMemoryAuthority::new().with_user(EMAIL, PASSWORD));
    let engine = Arc::new(SyncEngine::new(authority.clone(), authority.clone()));
    engine.session().login(EMAIL, PASSWORD).await.unwrap();
    assert!(engine.sync_identity().await);
    for name in names {
        let outcome = engine.controller().create(name, TaskPriority::Medium).await;
        assert!(outcome.is_applied());
    }
    let tasks = engine.collection().snapshot();
    (engine, authority, tasks)
}

// ─── Toggle Round Trip ──────────────────────────────────────────────────────

mod toggle {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn success_updates_status_and_settles_in_order() {
        let (engine, _authority, tasks) = engine_with_tasks(&["Water plants"]).await;
        let task = &tasks[0];
        let mut events = engine.subscribe();

        let outcome = engine.controller().toggle_completion(task).await;
        assert_eq!(outcome, MutationOutcome::Applied);

        let after = engine.collection().get(&task.id).unwrap();
        assert_eq!(after.status, TaskStatus::Completed);
        assert!(!engine.rows().is_pending(&task.id));

        // Pending flips on before the remote call, the update lands, and
        // the row settles last.
        let expected = [
            StoreEvent::RowPending {
                task_id: task.id.clone(),
            },
            StoreEvent::TaskUpdated {
                task_id: task.id.clone(),
            },
            StoreEvent::RowSettled {
                task_id: task.id.clone(),
            },
        ];
        for event in expected {
            assert_eq!(events.try_recv().unwrap(), event);
        }
    }

    #[tokio::test]
    async fn failure_keeps_status_and_records_one_notice() {
        let (engine, authority, tasks) = engine_with_tasks(&["Water plants"]).await;
        let task = &tasks[0];
        let mut events = engine.subscribe();

        authority.inject_failure(ApiError::transport("connection reset"));
        let outcome = engine.controller().toggle_completion(task).await;
        assert_eq!(outcome, MutationOutcome::Rejected);

        let after = engine.collection().get(&task.id).unwrap();
        assert_eq!(after.status, TaskStatus::InProgress);
        assert!(!engine.rows().is_pending(&task.id));

        let notices = engine.controller().notices();
        assert_eq!(notices.len(), 1);
        assert!(notices[0].message.contains("Water plants"));

        // No TaskUpdated between pending and settled.
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::RowPending {
                task_id: task.id.clone()
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::RowSettled {
                task_id: task.id.clone()
            }
        );
    }

    #[tokio::test]
    async fn toggling_twice_returns_to_in_progress() {
        let (engine, _authority, tasks) = engine_with_tasks(&["Flip me"]).await;

        engine.controller().toggle_completion(&tasks[0]).await;
        let flipped = engine.collection().get(&tasks[0].id).unwrap();
        assert!(flipped.status.is_completed());

        engine.controller().toggle_completion(&flipped).await;
        let back = engine.collection().get(&tasks[0].id).unwrap();
        assert_eq!(back.status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn priority_and_rename_go_through_the_same_protocol() {
        let (engine, _authority, tasks) = engine_with_tasks(&["Chore"]).await;

        let outcome = engine
            .controller()
            .set_priority(&tasks[0], TaskPriority::High)
            .await;
        assert!(outcome.is_applied());

        let current = engine.collection().get(&tasks[0].id).unwrap();
        let outcome = engine.controller().rename(&current, "Big chore").await;
        assert!(outcome.is_applied());

        let after = engine.collection().get(&tasks[0].id).unwrap();
        assert_eq!(after.priority, TaskPriority::High);
        assert_eq!(after.name, "Big chore");
    }
}

// ─── Duplicate Suppression ──────────────────────────────────────────────────

mod duplicates {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn second_toggle_on_a_pending_row_is_ignored() {
        let (engine, authority, tasks) = engine_with_tasks(&["Slow row"]).await;
        let task = tasks[0].clone();

        authority.delay_next_response(Duration::from_millis(50));
        let in_flight = {
            let engine = engine.clone();
            let task = task.clone();
            tokio::spawn(async move { engine.controller().toggle_completion(&task).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(engine.rows().is_pending(&task.id));

        // The duplicate is dropped without a remote call.
        let duplicate = engine.controller().toggle_completion(&task).await;
        assert_eq!(duplicate, MutationOutcome::Ignored);
        assert_eq!(authority.call_counts().update, 1);

        assert_eq!(in_flight.await.unwrap(), MutationOutcome::Applied);
        let after = engine.collection().get(&task.id).unwrap();
        assert!(after.status.is_completed());
        assert_eq!(authority.call_counts().update, 1);
    }

    #[tokio::test]
    async fn other_rows_stay_interactive_while_one_is_pending() {
        let (engine, authority, tasks) = engine_with_tasks(&["slow", "free"]).await;
        let slow = tasks[0].clone();
        let free = tasks[1].clone();

        authority.delay_next_response(Duration::from_millis(50));
        let in_flight = {
            let engine = engine.clone();
            let slow = slow.clone();
            tokio::spawn(async move { engine.controller().toggle_completion(&slow).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        // The other row mutates immediately, while the first is pending.
        let outcome = engine.controller().toggle_completion(&free).await;
        assert_eq!(outcome, MutationOutcome::Applied);
        assert!(engine.rows().is_pending(&slow.id));
        assert!(!engine.rows().is_pending(&free.id));

        assert_eq!(in_flight.await.unwrap(), MutationOutcome::Applied);
        assert_eq!(authority.call_counts().update, 2);
    }
}

// ─── View Projection ────────────────────────────────────────────────────────

mod view_projection {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn pending_row_shows_spinner_others_keep_checkboxes() {
        let (engine, authority, tasks) = engine_with_tasks(&["slow", "free"]).await;
        let slow = tasks[0].clone();

        authority.delay_next_response(Duration::from_millis(50));
        let in_flight = {
            let engine = engine.clone();
            let slow = slow.clone();
            tokio::spawn(async move { engine.controller().toggle_completion(&slow).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        let view = engine.view();
        assert_eq!(view.row(&slow.id).unwrap().control(), RowControl::Spinner);
        assert_eq!(
            view.row(&tasks[1].id).unwrap().control(),
            RowControl::Checkbox { checked: false }
        );

        in_flight.await.unwrap();
        let view = engine.view();
        assert_eq!(
            view.row(&slow.id).unwrap().control(),
            RowControl::Checkbox { checked: true }
        );
        assert!(view.row(&slow.id).unwrap().dimmed());
    }

    #[tokio::test]
    async fn rows_render_in_collection_order() {
        let (engine, _authority, _tasks) = engine_with_tasks(&["first", "second", "third"]).await;
        let names: Vec<String> = engine.view().rows.into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn view_is_empty_after_logout() {
        let (engine, _authority, _tasks) = engine_with_tasks(&["gone soon"]).await;
        engine.logout_and_clear().await;
        assert!(engine.view().is_empty());
    }
}

// ─── Pending-Row Garbage Collection ─────────────────────────────────────────

mod garbage_collection {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn logout_collects_pending_rows_and_discards_their_results() {
        let (engine, authority, tasks) = engine_with_tasks(&["doomed"]).await;
        let task = tasks[0].clone();

        authority.delay_next_response(Duration::from_millis(50));
        let in_flight = {
            let engine = engine.clone();
            let task = task.clone();
            tokio::spawn(async move { engine.controller().toggle_completion(&task).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(engine.rows().is_pending(&task.id));

        engine.logout_and_clear().await;

        // The pending entry went with its task...
        assert!(!engine.rows().is_pending(&task.id));
        // ...and the late result was discarded, not applied.
        assert_eq!(in_flight.await.unwrap(), MutationOutcome::Rejected);
        assert!(engine.collection().is_empty());
    }
}
