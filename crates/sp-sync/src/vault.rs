//! Side-file backup of the local store around identity transitions.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sp_local_db::LocalStore;
use sp_remote::{GoalRecord, SprintRecord};
use tracing::{debug, warn};

use crate::run_blocking;

const SNAPSHOT_FILE_NAME: &str = "pre_login_snapshot.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotPayload {
    goals: Vec<GoalRecord>,
    sprints: Vec<SprintRecord>,
}

/// Point-in-time full backup of the local store, used only around identity
/// transitions (sign-in, sign-up, sign-out).
///
/// Existence is binary: one side file, overwritten on each capture, never
/// versioned or merged. The vault is a best-effort safety net: callers log
/// and swallow capture/restore failures, but a failed restore never leaves
/// the store half-replaced.
#[derive(Debug, Clone)]
pub struct SnapshotVault {
    store: LocalStore,
    path: PathBuf,
}

impl SnapshotVault {
    /// Create a vault writing its side file into the given directory.
    pub fn new(store: LocalStore, dir: impl AsRef<Path>) -> Self {
        Self {
            store,
            path: dir.as_ref().join(SNAPSHOT_FILE_NAME),
        }
    }

    /// Path of the snapshot side file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a snapshot currently exists.
    pub fn has_snapshot(&self) -> bool {
        self.path.exists()
    }

    /// Serialize the entire local store into the side file, overwriting any
    /// prior snapshot.
    pub async fn capture(&self) -> crate::Result<()> {
        let store = self.store.clone();
        let path = self.path.clone();
        run_blocking(move || {
            let goals = store.all_goals()?;
            let sprints = store.all_sprints()?;
            let payload = SnapshotPayload {
                goals: goals.iter().map(GoalRecord::from_goal).collect(),
                sprints: sprints.iter().map(SprintRecord::from_sprint).collect(),
            };
            std::fs::write(&path, serde_json::to_string(&payload)?)?;
            debug!(
                path = %path.display(),
                goals = payload.goals.len(),
                sprints = payload.sprints.len(),
                "captured snapshot"
            );
            Ok(())
        })
        .await
    }

    /// Replace the local store with the snapshot's contents.
    ///
    /// A no-op when no snapshot exists. The payload is deserialized in full
    /// before the store is touched (never stream-replaced) and applied in
    /// one transaction across both collections, so an I/O or parse error
    /// cannot corrupt the existing store.
    pub async fn restore(&self) -> crate::Result<()> {
        let store = self.store.clone();
        let path = self.path.clone();
        run_blocking(move || {
            if !path.exists() {
                debug!("no snapshot to restore");
                return Ok(());
            }
            let json = std::fs::read_to_string(&path)?;
            let payload: SnapshotPayload = serde_json::from_str(&json)?;

            let goals: Vec<_> = payload.goals.iter().filter_map(GoalRecord::to_goal).collect();
            let sprints: Vec<_> = payload
                .sprints
                .iter()
                .filter_map(SprintRecord::to_sprint)
                .collect();
            if goals.len() != payload.goals.len() || sprints.len() != payload.sprints.len() {
                warn!("snapshot contained malformed records, restoring the rest");
            }

            store.replace_all(&goals, &sprints)?;
            debug!(
                goals = goals.len(),
                sprints = sprints.len(),
                "restored snapshot"
            );
            Ok(())
        })
        .await
    }

    /// Delete the side file. Idempotent.
    pub fn clear(&self) -> crate::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
