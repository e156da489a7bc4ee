//! High-level store facade.
//!
//! `LocalStore` owns the shared `Database` handle and exposes the write
//! commands and read queries the rest of the system uses, wrapping the
//! multi-statement ones in transactions.

use std::path::Path;

use sp_core::{Goal, GoalStatus, GoalWithProgress, SprintHistoryItem, SprintRecord};

use crate::connection::Database;
use crate::models::{GoalStore, SprintStore};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The local store for goals and sprint records.
///
/// Cheap to clone; all clones share one underlying connection.
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    /// Wrap an already-open database.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open (and migrate) the database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        Ok(Self::new(Database::open(path)?))
    }

    /// Open an in-memory store for testing.
    pub fn open_in_memory() -> crate::Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Access the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create a new active goal.
    ///
    /// Any previously active goal is demoted to gave-up in the same
    /// transaction, so at most one goal is ever active.
    pub fn create_goal(
        &self,
        title: &str,
        target_sprints: Option<i64>,
    ) -> crate::Result<Goal> {
        if title.trim().is_empty() {
            return Err(crate::Error::constraint("goal title must not be blank"));
        }
        if let Some(target) = target_sprints {
            if target <= 0 {
                return Err(crate::Error::constraint(
                    "target sprint count must be positive",
                ));
            }
        }

        let mut goal = Goal::new(title, target_sprints);
        self.db.transaction(|conn| {
            let goals = GoalStore::new(conn);
            goals.demote_active(goal.last_modified)?;
            goal.id = goals.insert(&goal)?;
            Ok(())
        })?;
        Ok(goal)
    }

    /// Mark a goal completed, stamping the completion time.
    pub fn complete_goal(&self, goal_id: i64) -> crate::Result<()> {
        self.update_goal_status(goal_id, GoalStatus::Completed)
    }

    /// Mark a goal gave-up.
    pub fn give_up_goal(&self, goal_id: i64) -> crate::Result<()> {
        self.update_goal_status(goal_id, GoalStatus::GaveUp)
    }

    fn update_goal_status(&self, goal_id: i64, status: GoalStatus) -> crate::Result<()> {
        let now = now_millis();
        let completed_at = match status {
            GoalStatus::Completed => Some(now),
            _ => None,
        };

        let conn = self.lock_connection()?;
        let affected = GoalStore::new(&conn).update_status(goal_id, status, completed_at, now)?;
        if affected == 0 {
            return Err(crate::Error::generic(format!(
                "goal {} does not exist",
                goal_id
            )));
        }
        Ok(())
    }

    /// Record a completed sprint against a goal.
    pub fn record_sprint(
        &self,
        parent_goal_id: i64,
        task_content: &str,
        target_duration_secs: i64,
        actual_duration_secs: i64,
    ) -> crate::Result<SprintRecord> {
        if target_duration_secs <= 0 {
            return Err(crate::Error::constraint(
                "target duration must be positive",
            ));
        }
        if actual_duration_secs < 1 || actual_duration_secs > target_duration_secs {
            return Err(crate::Error::constraint(
                "actual duration must be between 1 and the target duration",
            ));
        }

        let mut record = SprintRecord::new(
            parent_goal_id,
            task_content,
            target_duration_secs,
            actual_duration_secs,
        );
        let conn = self.lock_connection()?;
        record.id = SprintStore::new(&conn).insert(&record)?;
        Ok(record)
    }

    /// The single active goal with its sprint count, in one read.
    pub fn active_goal_with_progress(&self) -> crate::Result<Option<GoalWithProgress>> {
        let conn = self.lock_connection()?;
        GoalStore::new(&conn).active_with_progress()
    }

    /// All goals with their per-goal sprint counts, newest first.
    pub fn goals_with_sprint_counts(&self) -> crate::Result<Vec<(Goal, i64)>> {
        let conn = self.lock_connection()?;
        GoalStore::new(&conn).list_with_sprint_counts()
    }

    /// Sprint history joined with goal titles, newest first.
    pub fn history(&self) -> crate::Result<Vec<SprintHistoryItem>> {
        let conn = self.lock_connection()?;
        SprintStore::new(&conn).history()
    }

    /// Sprint history within an inclusive epoch-millis range, newest first.
    pub fn history_between(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> crate::Result<Vec<SprintHistoryItem>> {
        let conn = self.lock_connection()?;
        SprintStore::new(&conn).history_between(start_ms, end_ms)
    }

    /// Count the sprints recorded against one goal.
    pub fn sprint_count_for_goal(&self, goal_id: i64) -> crate::Result<i64> {
        let conn = self.lock_connection()?;
        SprintStore::new(&conn).count_for_goal(goal_id)
    }

    /// Get a goal by id.
    pub fn goal(&self, goal_id: i64) -> crate::Result<Option<Goal>> {
        let conn = self.lock_connection()?;
        GoalStore::new(&conn).get(goal_id)
    }

    /// All goals.
    pub fn all_goals(&self) -> crate::Result<Vec<Goal>> {
        let conn = self.lock_connection()?;
        GoalStore::new(&conn).list()
    }

    /// All sprint records.
    pub fn all_sprints(&self) -> crate::Result<Vec<SprintRecord>> {
        let conn = self.lock_connection()?;
        SprintStore::new(&conn).list()
    }

    /// Delete a goal; its sprint records cascade.
    pub fn delete_goal(&self, goal_id: i64) -> crate::Result<()> {
        let conn = self.lock_connection()?;
        GoalStore::new(&conn).delete(goal_id)?;
        Ok(())
    }

    /// Atomically replace both collections with the given sets.
    ///
    /// Delete-all then bulk-insert, in one transaction spanning both tables:
    /// a crash cannot leave goals from one source paired with sprints from
    /// another.
    pub fn replace_all(
        &self,
        goals: &[Goal],
        sprints: &[SprintRecord],
    ) -> crate::Result<()> {
        self.db.transaction(|conn| {
            // Goals first: the delete cascades over old sprints and the new
            // sprints need their parents in place.
            GoalStore::new(conn).replace_all(goals)?;
            SprintStore::new(conn).replace_all(sprints)?;
            Ok(())
        })
    }

    /// Stamp the given owner onto every row that has none.
    pub fn claim_unowned(&self, owner_id: &str) -> crate::Result<()> {
        self.db.transaction(|conn| {
            GoalStore::new(conn).claim_without_owner(owner_id)?;
            SprintStore::new(conn).claim_without_owner(owner_id)?;
            Ok(())
        })
    }

    /// All rows owned by the given scope id.
    pub fn owned_by(&self, owner_id: &str) -> crate::Result<(Vec<Goal>, Vec<SprintRecord>)> {
        let conn = self.lock_connection()?;
        let goals = GoalStore::new(&conn).list_by_owner(owner_id)?;
        let sprints = SprintStore::new(&conn).list_by_owner(owner_id)?;
        Ok((goals, sprints))
    }

    /// Flip the synced flag on every row owned by the given scope id.
    pub fn mark_owner_synced(&self, owner_id: &str, synced: bool) -> crate::Result<()> {
        self.db.transaction(|conn| {
            GoalStore::new(conn).mark_synced(owner_id, synced)?;
            SprintStore::new(conn).mark_synced(owner_id, synced)?;
            Ok(())
        })
    }

    fn lock_connection(&self) -> crate::Result<std::sync::MutexGuard<'_, rusqlite::Connection>> {
        self.db.connection().lock().map_err(|e| {
            crate::Error::generic(format!("Failed to acquire database lock: {}", e))
        })
    }
}
