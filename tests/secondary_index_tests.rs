//! Tests for the secondary index
//!
//! These tests verify:
//! - Tail-append list order (insertion order preserved)
//! - Unseen keys yield empty results, not errors
//! - Unlinking head / middle / tail nodes, with head-pointer updates
//! - Free-slot tombstoning and recycling before arena growth
//! - An emptied key keeps its map entry
//! - Persistence across both mirror files

use std::path::PathBuf;

use flatstore::index::SecondaryIndex;
use flatstore::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let index_path = temp_dir.path().join("doctors.sk");
    let label_path = temp_dir.path().join("doctors.labels");
    (temp_dir, index_path, label_path)
}

fn open(index_path: &PathBuf, label_path: &PathBuf) -> SecondaryIndex {
    SecondaryIndex::open(index_path.clone(), label_path.clone(), "doctors").unwrap()
}

// =============================================================================
// Add / Lookup
// =============================================================================

#[test]
fn test_lookup_unseen_key_is_empty() {
    let (_temp, index_path, label_path) = setup();
    let index = open(&index_path, &label_path);
    assert!(index.lookup_all("Alice").unwrap().is_empty());
}

#[test]
fn test_add_preserves_insertion_order() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();
    index.add_key("Alice", "03").unwrap();
    index.add_key("Alice", "02").unwrap();

    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["01", "03", "02"]);
}

#[test]
fn test_distinct_keys_have_independent_lists() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();
    index.add_key("Bob", "02").unwrap();
    index.add_key("Alice", "03").unwrap();

    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["01", "03"]);
    assert_eq!(index.lookup_all("Bob").unwrap(), vec!["02"]);
}

// =============================================================================
// Removal
// =============================================================================

#[test]
fn test_remove_head_updates_head_pointer() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();
    index.add_key("Alice", "02").unwrap();

    index.remove_key("Alice", "01").unwrap();
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["02"]);
}

#[test]
fn test_remove_middle_relinks_neighbors() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    for id in ["01", "02", "03"] {
        index.add_key("Alice", id).unwrap();
    }

    index.remove_key("Alice", "02").unwrap();
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["01", "03"]);
}

#[test]
fn test_remove_tail() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    for id in ["01", "02", "03"] {
        index.add_key("Alice", id).unwrap();
    }

    index.remove_key("Alice", "03").unwrap();
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["01", "02"]);
}

#[test]
fn test_remove_unseen_secondary_key_fails() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();

    assert!(matches!(
        index.remove_key("Bob", "01").unwrap_err(),
        StoreError::NotFound { .. }
    ));
}

#[test]
fn test_remove_missing_primary_key_fails() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();

    assert!(matches!(
        index.remove_key("Alice", "09").unwrap_err(),
        StoreError::NotFound { .. }
    ));
    // The list is untouched
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["01"]);
}

#[test]
fn test_emptied_key_stays_mapped_and_reusable() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();
    index.remove_key("Alice", "01").unwrap();

    assert!(index.lookup_all("Alice").unwrap().is_empty());

    // Re-adding under the emptied key installs a fresh head
    index.add_key("Alice", "04").unwrap();
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["04"]);
}

// =============================================================================
// Free-Slot Pool
// =============================================================================

#[test]
fn test_freed_slot_is_recycled_before_growth() {
    let (_temp, index_path, label_path) = setup();
    let mut index = open(&index_path, &label_path);
    index.add_key("Alice", "01").unwrap();
    index.add_key("Alice", "02").unwrap();
    assert_eq!(index.arena_len(), 2);

    index.remove_key("Alice", "01").unwrap();
    assert_eq!(index.live_nodes(), 1);
    assert_eq!(index.arena_len(), 2);

    // The tombstoned slot is reused; the arena does not grow
    index.add_key("Bob", "03").unwrap();
    assert_eq!(index.live_nodes(), 2);
    assert_eq!(index.arena_len(), 2);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_reopen_rehydrates_lists() {
    let (_temp, index_path, label_path) = setup();
    {
        let mut index = open(&index_path, &label_path);
        index.add_key("Alice", "01").unwrap();
        index.add_key("Alice", "02").unwrap();
        index.add_key("Bob", "03").unwrap();
        index.remove_key("Alice", "01").unwrap();
    }

    let index = open(&index_path, &label_path);
    assert_eq!(index.lookup_all("Alice").unwrap(), vec!["02"]);
    assert_eq!(index.lookup_all("Bob").unwrap(), vec!["03"]);
    assert_eq!(index.live_nodes(), 2);
}

#[test]
fn test_mirror_files_use_sentinels() {
    let (_temp, index_path, label_path) = setup();
    {
        let mut index = open(&index_path, &label_path);
        index.add_key("Alice", "01").unwrap();
        index.add_key("Alice", "02").unwrap();
        index.remove_key("Alice", "01").unwrap();
        index.add_key("Bob", "03").unwrap();
        index.remove_key("Bob", "03").unwrap();
    }

    // Alice's list is 02 alone (head slot 01); Bob's is empty (-1); the
    // freed slot 00 is tombstoned with ##
    let index_contents = std::fs::read_to_string(&index_path).unwrap();
    assert_eq!(index_contents, "Alice|01\nBob|-1\n");

    let label_contents = std::fs::read_to_string(&label_path).unwrap();
    assert_eq!(label_contents, "00|##,##\n01|02,-1\n");
}
