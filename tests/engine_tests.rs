//! Tests for the engine context
//!
//! These tests verify:
//! - The doctor lifecycle scenarios (id assignment, slot reuse, no id reuse)
//! - Appointment foreign-key enforcement (reject before any mutation)
//! - Secondary lookups and unindexed scans through the typed API
//! - Grow/shrink update behavior end to end
//! - Persistence across engine restarts

use flatstore::{Engine, StoreError, UpdateOutcome};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_engine(dir: &TempDir) -> Engine {
    Engine::open_path(dir.path()).unwrap()
}

// =============================================================================
// Doctor Lifecycle
// =============================================================================

#[test]
fn test_delete_then_add_assigns_fresh_id_but_reuses_slot() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);

    assert_eq!(engine.add_doctor("Alice", "1 Main St").unwrap(), "01");
    assert_eq!(engine.add_doctor("Bob", "2 Oak Ave").unwrap(), "02");

    let alice_offset = engine.doctors().primary().lookup("01").unwrap();
    engine.delete_doctor("01").unwrap();

    // Carol gets a fresh id (no recycling of "01") but Alice's freed slot
    let carol = engine.add_doctor("Carol", "3 Elm Rd").unwrap();
    assert_eq!(carol, "03");
    assert_eq!(engine.doctors().primary().lookup("03"), Some(alice_offset));
}

#[test]
fn test_doctor_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let id = engine.add_doctor("Alice", "1 Main St").unwrap();

    let doctor = engine.doctor_by_id(&id).unwrap();
    assert_eq!(doctor.id, "01");
    assert_eq!(doctor.name, "Alice");
    assert_eq!(doctor.address, "1 Main St");
}

#[test]
fn test_doctor_exists() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let id = engine.add_doctor("Alice", "1 Main St").unwrap();

    assert!(engine.doctor_exists(&id));
    assert!(!engine.doctor_exists("42"));

    engine.delete_doctor(&id).unwrap();
    assert!(!engine.doctor_exists(&id));
}

#[test]
fn test_doctors_by_name_tracks_deletes() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let a = engine.add_doctor("Alice", "1 Main St").unwrap();
    engine.add_doctor("Alice", "2 Oak Ave").unwrap();
    engine.add_doctor("Bob", "3 Elm Rd").unwrap();

    let alices = engine.doctors_by_name("Alice").unwrap();
    assert_eq!(alices.len(), 2);
    assert_eq!(alices[0].id, "01");
    assert_eq!(alices[1].id, "02");

    engine.delete_doctor(&a).unwrap();
    let alices = engine.doctors_by_name("Alice").unwrap();
    assert_eq!(alices.len(), 1);
    assert_eq!(alices[0].id, "02");
}

#[test]
fn test_doctors_by_address_scans_unindexed_field() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    engine.add_doctor("Alice", "1 Main St").unwrap();
    engine.add_doctor("Bob", "2 Oak Ave").unwrap();
    engine.add_doctor("Carol", "1 Main St").unwrap();

    let at_main = engine.doctors_by_address("1 Main St").unwrap();
    assert_eq!(at_main.len(), 2);
    assert_eq!(at_main[0].name, "Alice");
    assert_eq!(at_main[1].name, "Carol");
}

#[test]
fn test_all_doctors_in_file_order() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    engine.add_doctor("Alice", "1 Main St").unwrap();
    let bob = engine.add_doctor("Bob", "2 Oak Ave").unwrap();
    engine.delete_doctor(&bob).unwrap();
    // Carol's payload outgrows Bob's freed slot and appends at the tail
    engine.add_doctor("Carol", "3 Elm Rd").unwrap();

    let names: Vec<String> = engine
        .all_doctors()
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["Alice", "Carol"]);
}

// =============================================================================
// Doctor Updates
// =============================================================================

#[test]
fn test_shrinking_name_update_keeps_identity() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let id = engine.add_doctor("Alice", "1 Main St").unwrap();

    let outcome = engine.update_doctor_name(&id, "Al").unwrap();
    assert_eq!(outcome, UpdateOutcome::InPlace);

    let doctor = engine.doctor_by_id(&id).unwrap();
    assert_eq!(doctor.name, "Al");

    // Secondary index followed the rename
    assert!(engine.doctors_by_name("Alice").unwrap().is_empty());
    assert_eq!(engine.doctors_by_name("Al").unwrap().len(), 1);
}

#[test]
fn test_growing_name_update_changes_identity() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let alice = engine.add_doctor("Alice", "1 Main St").unwrap();
    engine.add_doctor("Bob", "2 Oak Ave").unwrap();

    let outcome = engine.update_doctor_name(&alice, "Alexandria").unwrap();
    let new_id = match outcome {
        UpdateOutcome::Reinserted { new_id } => new_id,
        other => panic!("expected reinsert, got {:?}", other),
    };

    assert_eq!(new_id, "03");
    assert!(!engine.doctor_exists(&alice));
    assert_eq!(engine.doctor_by_id(&new_id).unwrap().name, "Alexandria");
    assert!(engine.doctors_by_name("Alice").unwrap().is_empty());
}

// =============================================================================
// Appointments / Referential Integrity
// =============================================================================

#[test]
fn test_appointment_with_unknown_doctor_is_rejected_without_mutation() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);

    let err = engine.add_appointment("2024-05-01", "99").unwrap_err();
    assert!(matches!(err, StoreError::UnknownDoctor(id) if id == "99"));

    // Nothing was written anywhere
    assert!(engine.all_appointments().unwrap().is_empty());
    assert_eq!(engine.appointments().primary().len(), 0);
    assert!(engine
        .appointments()
        .find_by_secondary("99")
        .unwrap()
        .is_empty());
}

#[test]
fn test_appointment_round_trip() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let doctor = engine.add_doctor("Alice", "1 Main St").unwrap();

    let id = engine.add_appointment("2024-05-01", &doctor).unwrap();
    assert_eq!(id, "01");

    let appointment = engine.appointment_by_id(&id).unwrap();
    assert_eq!(appointment.date, "2024-05-01");
    assert_eq!(appointment.doctor_id, doctor);
}

#[test]
fn test_appointments_by_doctor_in_insertion_order() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let alice = engine.add_doctor("Alice", "1 Main St").unwrap();
    let bob = engine.add_doctor("Bob", "2 Oak Ave").unwrap();

    engine.add_appointment("2024-05-01", &alice).unwrap();
    engine.add_appointment("2024-05-02", &bob).unwrap();
    let third = engine.add_appointment("2024-05-03", &alice).unwrap();

    let for_alice = engine.appointments_by_doctor(&alice).unwrap();
    assert_eq!(for_alice.len(), 2);
    assert_eq!(for_alice[0].date, "2024-05-01");
    assert_eq!(for_alice[1].date, "2024-05-03");

    engine.delete_appointment(&third).unwrap();
    let for_alice = engine.appointments_by_doctor(&alice).unwrap();
    assert_eq!(for_alice.len(), 1);
}

#[test]
fn test_appointments_by_date_scans_unindexed_field() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let alice = engine.add_doctor("Alice", "1 Main St").unwrap();
    let bob = engine.add_doctor("Bob", "2 Oak Ave").unwrap();
    engine.add_appointment("2024-05-01", &alice).unwrap();
    engine.add_appointment("2024-05-01", &bob).unwrap();
    engine.add_appointment("2024-05-02", &alice).unwrap();

    let on_first = engine.appointments_by_date("2024-05-01").unwrap();
    assert_eq!(on_first.len(), 2);
}

#[test]
fn test_update_appointment_date_in_place() {
    let temp = TempDir::new().unwrap();
    let mut engine = open_engine(&temp);
    let doctor = engine.add_doctor("Alice", "1 Main St").unwrap();
    let id = engine.add_appointment("2024-05-01", &doctor).unwrap();

    // Same-length date fits the slot
    let outcome = engine.update_appointment_date(&id, "2024-06-15").unwrap();
    assert_eq!(outcome, UpdateOutcome::InPlace);
    assert_eq!(engine.appointment_by_id(&id).unwrap().date, "2024-06-15");
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_restart_preserves_all_state() {
    let temp = TempDir::new().unwrap();
    {
        let mut engine = open_engine(&temp);
        let alice = engine.add_doctor("Alice", "1 Main St").unwrap();
        engine.add_doctor("Bob", "2 Oak Ave").unwrap();
        engine.add_appointment("2024-05-01", &alice).unwrap();
        engine.delete_doctor("02").unwrap();
    }

    let mut engine = open_engine(&temp);
    assert_eq!(engine.doctor_by_id("01").unwrap().name, "Alice");
    assert!(!engine.doctor_exists("02"));
    assert_eq!(engine.appointments_by_doctor("01").unwrap().len(), 1);

    // Ids continue monotonically and freed slots stay reusable
    // (Carol's 16-byte payload fits Bob's freed 18-byte slot)
    let carol = engine.add_doctor("Carol", "3 Elm").unwrap();
    assert_eq!(carol, "03");
    assert_eq!(engine.doctors().primary().lookup("03"), Some(25));
}
