//! Tests for the snapshot vault.

use sp_local_db::LocalStore;
use sp_sync::SnapshotVault;
use tempfile::TempDir;

fn vault_fixture() -> (TempDir, LocalStore, SnapshotVault) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let store = LocalStore::open_in_memory().expect("Failed to open in-memory store");
    let vault = SnapshotVault::new(store.clone(), dir.path());
    (dir, store, vault)
}

#[tokio::test]
async fn test_capture_then_restore_round_trips() {
    let (_dir, store, vault) = vault_fixture();
    let goal = store.create_goal("Before sign-in", Some(8)).unwrap();
    store.record_sprint(goal.id, "Warm up", 1500, 1200).unwrap();

    vault.capture().await.unwrap();
    assert!(vault.has_snapshot());

    let goals_before = store.all_goals().unwrap();
    let sprints_before = store.all_sprints().unwrap();

    // Mutations after the capture are discarded by the restore.
    store.create_goal("After sign-in", None).unwrap();

    vault.restore().await.unwrap();

    assert_eq!(store.all_goals().unwrap(), goals_before);
    assert_eq!(store.all_sprints().unwrap(), sprints_before);
}

#[tokio::test]
async fn test_restore_without_snapshot_is_a_noop() {
    let (_dir, store, vault) = vault_fixture();
    let goal = store.create_goal("Untouched", None).unwrap();

    vault.restore().await.unwrap();

    assert_eq!(store.goal(goal.id).unwrap().unwrap().title, "Untouched");
}

#[tokio::test]
async fn test_capture_overwrites_previous_snapshot() {
    let (_dir, store, vault) = vault_fixture();
    store.create_goal("First", None).unwrap();
    vault.capture().await.unwrap();

    let second = store.create_goal("Second", None).unwrap();
    vault.capture().await.unwrap();

    store.replace_all(&[], &[]).unwrap();
    vault.restore().await.unwrap();

    let goals = store.all_goals().unwrap();
    assert_eq!(goals.len(), 2);
    assert!(goals.iter().any(|g| g.id == second.id));
}

#[tokio::test]
async fn test_corrupt_snapshot_leaves_store_untouched() {
    let (_dir, store, vault) = vault_fixture();
    let goal = store.create_goal("Safe", None).unwrap();

    std::fs::write(vault.path(), "definitely not json").unwrap();
    assert!(vault.restore().await.is_err());

    assert_eq!(store.goal(goal.id).unwrap().unwrap().title, "Safe");
}

#[tokio::test]
async fn test_clear_is_idempotent() {
    let (_dir, store, vault) = vault_fixture();
    store.create_goal("Ephemeral", None).unwrap();

    vault.capture().await.unwrap();
    assert!(vault.has_snapshot());

    vault.clear().unwrap();
    assert!(!vault.has_snapshot());

    // Clearing an absent snapshot is fine.
    vault.clear().unwrap();
}
