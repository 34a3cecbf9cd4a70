//! Integration tests for the file-backed snapshot store and the typed
//! collection queries.

use huddle_db::SnapshotStore;
use huddle_db::models::{MediaKind, Recurrence};
use huddle_db::queries::{media, plans};
use huddle_test_utils::{TempStore, date, plan};

#[test]
fn saved_plans_survive_reopen_in_order() {
    let tmp = TempStore::new();
    let items = vec![
        plan("Newest", "b").id("2").on("2024-03-04").weekly().build(),
        plan("Oldest", "a").id("1").build(),
    ];
    plans::store_saved_plans(tmp.store(), &items).unwrap();

    let reopened = tmp.reopen();
    let loaded = plans::load_saved_plans(&reopened);
    assert_eq!(loaded, items);
    assert_eq!(loaded[0].recurrence, Recurrence::Weekly);
    assert_eq!(loaded[0].assigned_date, Some(date("2024-03-04")));
}

#[test]
fn missing_snapshot_loads_empty() {
    let tmp = TempStore::new();
    assert!(plans::load_saved_plans(tmp.store()).is_empty());
    assert!(media::load_media_items(tmp.store()).is_empty());
}

#[test]
fn corrupt_snapshot_file_loads_empty() {
    let tmp = TempStore::new();
    std::fs::write(tmp.path().join("saved_plans.json"), "[{\"title\": ").unwrap();
    assert!(plans::load_saved_plans(tmp.store()).is_empty());
}

#[test]
fn blank_snapshot_file_is_treated_as_absent() {
    let tmp = TempStore::new();
    std::fs::write(tmp.path().join("media_items.json"), "  \n").unwrap();
    assert_eq!(tmp.store().load("media_items").unwrap(), None);
}

#[test]
fn store_leaves_no_temporary_files_behind() {
    let tmp = TempStore::new();
    plans::store_saved_plans(tmp.store(), &[plan("A", "a").id("1").build()]).unwrap();
    plans::store_saved_plans(tmp.store(), &[]).unwrap();

    let names: Vec<String> = std::fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["saved_plans.json".to_owned()]);
    assert!(plans::load_saved_plans(tmp.store()).is_empty());
}

#[test]
fn store_creates_missing_data_directory() {
    let tmp = TempStore::new();
    let nested = huddle_db::FileSnapshotStore::new(tmp.path().join("a").join("b"));
    nested.store("k", "[]").unwrap();
    assert_eq!(nested.load("k").unwrap().as_deref(), Some("[]"));
}

#[test]
fn results_cache_is_independent_of_saved_plans() {
    let tmp = TempStore::new();
    plans::store_current_results(tmp.store(), &[plan("Draft", "x").build()]).unwrap();
    assert!(plans::load_saved_plans(tmp.store()).is_empty());
    assert_eq!(plans::load_current_results(tmp.store()).len(), 1);
}

#[test]
fn media_roundtrip_keeps_unknown_kinds() {
    let tmp = TempStore::new();
    let items = vec![
        huddle_test_utils::media("m2", "Flyer", MediaKind::Poster, Some("Easter")),
        huddle_test_utils::media("m1", "Bulletin", MediaKind::Other("Bulletin".into()), None),
    ];
    media::store_media_items(tmp.store(), &items).unwrap();
    assert_eq!(media::load_media_items(&tmp.reopen()), items);
}
