use super::{Store, StoreError};
use crate::domain::entry::{EntryPatch, JournalEntry, NewEntry};
use crate::domain::mood::Mood;
use crate::domain::profile::{ProfilePatch, UserProfile, DEFAULT_BIO, FIRST_NAMES, LAST_NAMES};
use crate::listing::{EntryFilter, FilterKind};
use uuid::Uuid;

fn unique_db_path() -> String {
    std::env::temp_dir()
        .join(format!("jotter-store-{}.sqlite", Uuid::now_v7()))
        .display()
        .to_string()
}

fn cleanup_db_files(path: &str) {
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{path}{suffix}"));
    }
}

/// An initialized store with the first-run sample entries cleared out, so
/// assertions see only what the test itself wrote.
fn fresh_store() -> (Store, String) {
    let path = unique_db_path();
    let mut store = Store::new(&path);
    store.initialize().expect("store should initialize");
    store.clear_all().expect("clear should succeed");
    (store, path)
}

fn entry(id: &str, date: &str) -> JournalEntry {
    JournalEntry {
        id: id.to_string(),
        title: format!("Entry {id}"),
        content: "Body".to_string(),
        date: date.to_string(),
        mood: Mood::Happy.glyph().to_string(),
        mood_label: Mood::Happy.label().to_string(),
        is_archived: false,
        is_favorite: false,
        created_at: 0,
        updated_at: 0,
    }
}

#[test]
fn created_entry_reads_back_with_store_assigned_fields() {
    let (mut store, path) = fresh_store();

    let created = store
        .create_entry(NewEntry {
            title: "First".to_string(),
            content: "Hello".to_string(),
            mood: Mood::Grateful,
        })
        .expect("create should succeed");

    assert!(created.id.starts_with("J-"));
    assert_eq!(created.mood, "🙏");
    assert_eq!(created.mood_label, "Grateful");
    assert!(created.created_at > 0);

    let loaded = store
        .get_entry(&created.id)
        .expect("get should succeed")
        .expect("entry should exist");
    assert_eq!(loaded, created);

    cleanup_db_files(&path);
}

#[test]
fn listing_orders_by_date_then_recency() {
    let (mut store, path) = fresh_store();
    for (id, date) in [
        ("old", "2025-01-01"),
        ("mid-first", "2025-01-02"),
        ("mid-second", "2025-01-02"),
        ("new", "2025-01-03"),
    ] {
        store.insert_entry(&entry(id, date)).expect("insert should succeed");
    }

    let listed = store.list_entries().expect("list should succeed");
    let ids: Vec<&str> = listed.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid-second", "mid-first", "old"]);

    cleanup_db_files(&path);
}

#[test]
fn archiving_hides_an_entry_from_the_default_view() {
    let (mut store, path) = fresh_store();
    store
        .insert_entry(&entry("keep", "2025-02-01"))
        .expect("insert should succeed");
    store
        .insert_entry(&entry("shelve", "2025-02-02"))
        .expect("insert should succeed");

    let archived = store
        .set_archived("shelve", true)
        .expect("archive should succeed");
    assert!(archived.is_archived);

    let visible = store
        .list_entries_with(&EntryFilter::default())
        .expect("list should succeed");
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, "keep");

    let shelved = store
        .list_entries_with(&EntryFilter {
            kind: FilterKind::Archived,
            ..EntryFilter::default()
        })
        .expect("list should succeed");
    assert_eq!(shelved.len(), 1);
    assert_eq!(shelved[0].id, "shelve");

    cleanup_db_files(&path);
}

#[test]
fn toggling_favorite_twice_restores_the_original_state() {
    let (mut store, path) = fresh_store();
    store
        .insert_entry(&entry("star", "2025-03-01"))
        .expect("insert should succeed");

    let starred = store.toggle_favorite("star").expect("toggle should succeed");
    assert!(starred.is_favorite);
    let unstarred = store.toggle_favorite("star").expect("toggle should succeed");
    assert!(!unstarred.is_favorite);

    cleanup_db_files(&path);
}

#[test]
fn inserting_a_duplicate_id_is_rejected() {
    let (mut store, path) = fresh_store();
    store
        .insert_entry(&entry("dup", "2025-04-01"))
        .expect("first insert should succeed");

    let err = store
        .insert_entry(&entry("dup", "2025-04-02"))
        .expect_err("second insert should fail");
    assert!(matches!(err, StoreError::DuplicateId(id) if id == "dup"));

    cleanup_db_files(&path);
}

#[test]
fn deleting_a_missing_entry_is_not_an_error() {
    let (mut store, path) = fresh_store();
    store
        .delete_entry("never-existed")
        .expect("delete should be idempotent");

    store
        .insert_entry(&entry("gone", "2025-05-01"))
        .expect("insert should succeed");
    store.delete_entry("gone").expect("delete should succeed");
    store.delete_entry("gone").expect("repeat delete should succeed");
    assert!(store
        .get_entry("gone")
        .expect("get should succeed")
        .is_none());

    cleanup_db_files(&path);
}

#[test]
fn updating_a_missing_entry_changes_nothing() {
    let (mut store, path) = fresh_store();
    let patch = EntryPatch {
        title: Some("Ghost".to_string()),
        ..EntryPatch::default()
    };
    store
        .update_entry("missing", &patch)
        .expect("update should be a quiet no-op");
    assert!(store.list_entries().expect("list should succeed").is_empty());

    cleanup_db_files(&path);
}

#[test]
fn set_archived_on_a_missing_entry_reports_not_found() {
    let (mut store, path) = fresh_store();
    let err = store
        .set_archived("missing", true)
        .expect_err("archiving a missing entry should fail");
    assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));

    cleanup_db_files(&path);
}

#[test]
fn first_run_profile_gets_a_generated_name_and_default_bio() {
    let (mut store, path) = fresh_store();

    let profile = store.ensure_profile().expect("ensure should succeed");
    let (first, last) = profile
        .name
        .split_once(' ')
        .expect("generated name should have two words");
    assert!(FIRST_NAMES.contains(&first));
    assert!(LAST_NAMES.contains(&last));
    assert_eq!(profile.bio, DEFAULT_BIO);

    // A second call returns the stored profile rather than regenerating.
    let again = store.ensure_profile().expect("ensure should succeed");
    assert_eq!(again.name, profile.name);

    cleanup_db_files(&path);
}

#[test]
fn profile_row_is_a_singleton() {
    let (mut store, path) = fresh_store();
    store
        .insert_profile(&UserProfile {
            name: "Original".to_string(),
            bio: "kept".to_string(),
            profile_picture: None,
        })
        .expect("first insert should succeed");

    let err = store
        .insert_profile(&UserProfile {
            name: "Second".to_string(),
            bio: String::new(),
            profile_picture: None,
        })
        .expect_err("second profile should be rejected");
    assert!(matches!(err, StoreError::ProfileExists));

    let stored = store
        .get_profile()
        .expect("get should succeed")
        .expect("profile should exist");
    assert_eq!(stored.name, "Original");
    assert_eq!(stored.bio, "kept");

    cleanup_db_files(&path);
}

#[test]
fn profile_patch_updates_only_present_fields() {
    let (mut store, path) = fresh_store();
    store
        .insert_profile(&UserProfile {
            name: "Before".to_string(),
            bio: "original bio".to_string(),
            profile_picture: None,
        })
        .expect("insert should succeed");

    store
        .update_profile(&ProfilePatch {
            name: Some("After".to_string()),
            ..ProfilePatch::default()
        })
        .expect("update should succeed");

    let stored = store
        .get_profile()
        .expect("get should succeed")
        .expect("profile should exist");
    assert_eq!(stored.name, "After");
    assert_eq!(stored.bio, "original bio");

    cleanup_db_files(&path);
}

#[test]
fn clear_all_removes_entries_and_profile() {
    let (mut store, path) = fresh_store();
    store
        .insert_entry(&entry("doomed", "2025-06-01"))
        .expect("insert should succeed");
    store.ensure_profile().expect("ensure should succeed");

    store.clear_all().expect("clear should succeed");
    assert!(store.list_entries().expect("list should succeed").is_empty());
    assert!(store.get_profile().expect("get should succeed").is_none());

    cleanup_db_files(&path);
}

#[test]
fn fresh_install_is_seeded_with_welcome_entries() {
    let path = unique_db_path();
    let mut store = Store::new(&path);
    store.initialize().expect("store should initialize");

    let entries = store.list_entries().expect("list should succeed");
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().any(|e| e.id == "welcome-entry" && e.is_favorite));
    assert!(entries.iter().any(|e| e.id == "sample-thoughtful"));

    cleanup_db_files(&path);
}

#[test]
fn reinitializing_does_not_duplicate_seeds() {
    let path = unique_db_path();
    {
        let mut store = Store::new(&path);
        store.initialize().expect("first open should succeed");
    }
    let mut store = Store::new(&path);
    store.initialize().expect("second open should succeed");
    assert_eq!(store.list_entries().expect("list should succeed").len(), 2);

    cleanup_db_files(&path);
}
