//! Plan book behaviour: toggle-save, two-phase deletion, editing, and
//! write-through persistence.

use std::sync::Arc;

use huddle_core::calendar::occurrence_of;
use huddle_core::store::{Completion, StoreError};
use huddle_core::{PlanBook, ToggleOutcome};
use huddle_db::models::PlanningItem;
use huddle_db::queries::plans;
use huddle_db::{MemorySnapshotStore, SnapshotStore};
use huddle_test_utils::{TempStore, date, plan};

/// A plan book over an in-memory store, with `results` already generated.
fn book_with_results(results: Vec<PlanningItem>) -> (PlanBook, Arc<MemorySnapshotStore>) {
    let store = Arc::new(MemorySnapshotStore::new());
    let mut book = PlanBook::open(store.clone());
    let ticket = book.begin_request().unwrap();
    match book.complete_request::<String>(ticket, Ok(results)) {
        Completion::Applied(_) => {}
        other => panic!("results not applied: {other:?}"),
    }
    (book, store)
}

fn saved_snapshot(store: &dyn SnapshotStore) -> Vec<PlanningItem> {
    plans::load_saved_plans(store)
}

#[test]
fn toggle_save_assigns_id_once_and_refreshes_result() {
    let draft = plan("Game Night", "Dominoes").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);

    let saved = match book.toggle_save(&draft).unwrap() {
        ToggleOutcome::Saved(item) => item,
        other => panic!("expected Saved, got {other:?}"),
    };
    let id = saved.id.clone().unwrap();
    assert!(saved.saved_at.is_some());

    // The results entry is now the identified copy.
    assert_eq!(book.results()[0].id.as_deref(), Some(id.as_str()));
    assert!(book.is_saved(&book.results()[0]));
    assert_eq!(saved_snapshot(store.as_ref()), vec![saved.clone()]);

    // Toggling again stages deletion without assigning a new id.
    let refreshed = book.results()[0].clone();
    match book.toggle_save(&refreshed).unwrap() {
        ToggleOutcome::PendingDeletion(item) => assert_eq!(item.id.as_deref(), Some(id.as_str())),
        other => panic!("expected PendingDeletion, got {other:?}"),
    }
    assert_eq!(book.saved().len(), 1);
    assert_eq!(saved_snapshot(store.as_ref()).len(), 1);
}

#[test]
fn confirmed_deletion_removes_saved_copy_only() {
    let draft = plan("Game Night", "Dominoes").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);
    book.toggle_save(&draft).unwrap();
    let refreshed = book.results()[0].clone();
    book.toggle_save(&refreshed).unwrap();

    let removed = book.confirm_deletion().unwrap().unwrap();
    assert_eq!(removed.title, "Game Night");
    assert!(book.saved().is_empty());
    assert!(book.pending_deletion().is_none());
    assert!(saved_snapshot(store.as_ref()).is_empty());

    // The ephemeral copy survives and is no longer saved.
    assert_eq!(book.results().len(), 1);
    assert!(!book.is_saved(&book.results()[0]));
}

#[test]
fn id_less_item_matches_saved_copy_by_content() {
    let draft = plan("Lyme", "Beach day").build();
    let (mut book, _store) = book_with_results(vec![draft.clone()]);
    book.toggle_save(&draft).unwrap();

    // The original draft has no id but the same title and description.
    assert!(book.is_saved(&draft));
    assert!(matches!(
        book.toggle_save(&draft).unwrap(),
        ToggleOutcome::PendingDeletion(_)
    ));
}

#[test]
fn newest_saved_first() {
    let a = plan("A", "a").build();
    let b = plan("B", "b").build();
    let (mut book, store) = book_with_results(vec![a.clone(), b.clone()]);
    book.toggle_save(&a).unwrap();
    book.toggle_save(&b).unwrap();

    let titles: Vec<String> = saved_snapshot(store.as_ref())
        .into_iter()
        .map(|p| p.title)
        .collect();
    assert_eq!(titles, ["B", "A"]);
}

#[test]
fn update_of_result_only_item_performs_no_write() {
    let draft = plan("Retreat", "Weekend").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);

    let mut changed = draft.clone();
    changed.assigned_date = Some(date("2024-04-06"));
    book.update(&changed).unwrap();

    assert_eq!(book.results()[0].assigned_date, Some(date("2024-04-06")));
    assert!(book.saved().is_empty());
    assert!(store.is_empty());
}

#[test]
fn update_keeps_both_collections_in_step() {
    let draft = plan("Retreat", "Weekend").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);
    book.toggle_save(&draft).unwrap();

    let mut changed = book.results()[0].clone();
    changed.notes = Some("Bring tents".into());
    changed.assigned_date = Some(date("2024-04-06"));
    book.update(&changed).unwrap();

    assert_eq!(book.results()[0], changed);
    assert_eq!(book.saved()[0], changed);
    assert_eq!(saved_snapshot(store.as_ref())[0], changed);
}

#[test]
fn update_with_id_less_copy_keeps_saved_identity() {
    let draft = plan("Retreat", "Weekend").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);
    let saved = match book.toggle_save(&draft).unwrap() {
        ToggleOutcome::Saved(item) => item,
        other => panic!("expected Saved, got {other:?}"),
    };

    // The caller still holds the ephemeral copy, matched by content.
    let mut changed = draft.clone();
    changed.assigned_date = Some(date("2024-04-06"));
    book.update(&changed).unwrap();

    let snapshot = saved_snapshot(store.as_ref());
    assert_eq!(snapshot[0].id, saved.id);
    assert_eq!(snapshot[0].saved_at, saved.saved_at);
    assert_eq!(snapshot[0].assigned_date, Some(date("2024-04-06")));
    assert_eq!(book.saved()[0].id, saved.id);
    assert_eq!(book.results()[0].id, saved.id);
    assert!(book.is_saved(&book.results()[0]));

    // The plan can still be moved on the calendar.
    let id = saved.id.clone().unwrap();
    let items = book.saved().to_vec();
    let occurrence = occurrence_of(&items, &id, date("2024-04-06")).unwrap();
    let moved = book
        .move_occurrence(&occurrence, date("2024-04-13"))
        .unwrap()
        .unwrap();
    assert_eq!(moved.id.as_deref(), Some(id.as_str()));
    assert_eq!(book.saved()[0].assigned_date, Some(date("2024-04-13")));
}

#[test]
fn update_does_not_assign_ids() {
    let draft = plan("Retreat", "Weekend").build();
    let (mut book, _store) = book_with_results(vec![draft.clone()]);
    let mut changed = draft.clone();
    changed.notes = Some("n".into());
    book.update(&changed).unwrap();
    assert!(book.results()[0].is_ephemeral());
}

#[test]
fn save_edited_matches_saved_copy_by_id_only() {
    let draft = plan("Retreat", "Weekend").build();
    let (mut book, store) = book_with_results(vec![draft.clone()]);
    let saved = match book.toggle_save(&draft).unwrap() {
        ToggleOutcome::Saved(item) => item,
        other => panic!("expected Saved, got {other:?}"),
    };

    let mut edited = saved.clone();
    edited.title = "Spiritual Retreat".into();
    edited.description = "Two nights".into();
    let stored = book.save_edited(&edited).unwrap();

    assert_eq!(stored.id, saved.id);
    assert_eq!(book.saved().len(), 1);
    assert_eq!(book.saved()[0].title, "Spiritual Retreat");
    assert_eq!(book.saved()[0].saved_at, saved.saved_at);
    assert_eq!(book.results()[0].title, "Spiritual Retreat");
    assert_eq!(saved_snapshot(store.as_ref())[0].title, "Spiritual Retreat");
}

#[test]
fn save_edited_new_item_is_prepended_with_id_and_timestamp() {
    let draft = plan("Drafted", "By hand").build();
    let (mut book, _store) = book_with_results(vec![draft.clone()]);
    book.toggle_save(&plan("Older", "o").build()).unwrap();

    let stored = book.save_edited(&draft).unwrap();
    assert!(stored.id.is_some());
    assert!(stored.saved_at.is_some());
    assert_eq!(book.saved()[0].title, "Drafted");
    assert_eq!(book.saved().len(), 2);
    // The matching result picked up the new id.
    assert_eq!(book.results()[0].id, stored.id);
}

#[test]
fn editing_paths_reject_recurrence_without_anchor() {
    let mut bad = plan("Loose", "x").build();
    bad.recurrence = huddle_db::models::Recurrence::Weekly;
    let (mut book, store) = book_with_results(vec![]);

    assert!(matches!(book.save_edited(&bad), Err(StoreError::Invalid(_))));
    assert!(matches!(book.update(&bad), Err(StoreError::Invalid(_))));
    assert!(store.is_empty());
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let draft = plan("Camp", "Three days").build();
    // Room for the empty snapshots only.
    let store = Arc::new(MemorySnapshotStore::with_quota(4));
    let mut book = PlanBook::open(store.clone());
    let ticket = book.begin_request().unwrap();
    book.complete_request::<String>(ticket, Ok(vec![draft.clone()]));

    let err = book.toggle_save(&draft).unwrap_err();
    assert!(matches!(err, StoreError::Persist { .. }), "got {err:?}");
    assert!(book.saved().is_empty());
    assert_eq!(book.results(), [draft.clone()]);
    assert!(!book.is_saved(&draft));

    let edited = book.save_edited(&draft).unwrap_err();
    assert!(matches!(edited, StoreError::Persist { .. }));
    assert!(book.saved().is_empty());
    assert!(book.results()[0].is_ephemeral());
}

#[test]
fn failed_delete_keeps_item_and_pending_slot() {
    let draft = plan("Camp", "Three days").id("c1").build();
    let store = Arc::new(MemorySnapshotStore::with_quota(0));
    store.insert_raw(
        plans::SAVED_PLANS_KEY,
        &serde_json::to_string(&[draft.clone()]).unwrap(),
    );
    let mut book = PlanBook::open(store);

    book.toggle_save(&draft).unwrap();
    assert!(book.confirm_deletion().is_err());
    assert_eq!(book.saved().len(), 1);
    assert!(book.pending_deletion().is_some());
}

#[test]
fn results_cache_survives_reopen() {
    let tmp = TempStore::new();
    let store: Arc<dyn SnapshotStore> = Arc::new(tmp.reopen());
    let mut book = PlanBook::open_with_results_cache(store);
    let ticket = book.begin_request().unwrap();
    book.complete_request::<String>(ticket, Ok(vec![plan("Cached", "c").build()]));
    let draft = book.results()[0].clone();
    book.toggle_save(&draft).unwrap();

    let reopened = PlanBook::open_with_results_cache(Arc::new(tmp.reopen()));
    assert_eq!(reopened.results().len(), 1);
    assert!(reopened.results()[0].id.is_some());
    assert!(reopened.is_saved(&reopened.results()[0]));

    // A plain book does not see the cache.
    assert!(PlanBook::open(Arc::new(tmp.reopen())).results().is_empty());
}

#[test]
fn reset_view_clears_results_and_cache() {
    let tmp = TempStore::new();
    let mut book = PlanBook::open_with_results_cache(Arc::new(tmp.reopen()));
    let ticket = book.begin_request().unwrap();
    book.complete_request::<String>(ticket, Ok(vec![plan("Gone", "g").build()]));
    book.reset_view();

    assert!(book.results().is_empty());
    assert!(plans::load_current_results(tmp.store()).is_empty());
}
