//! Per-table stores and row mapping.

use rusqlite::{params, Connection, Row};
use sp_core::{Goal, GoalStatus, GoalWithProgress, SprintHistoryItem, SprintRecord};

fn status_from_sql(idx: usize, name: String) -> rusqlite::Result<GoalStatus> {
    GoalStatus::from_name(&name).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unknown goal status `{}`", name).into(),
        )
    })
}

const GOAL_COLUMNS: &str = "goal_id, title, status, total_sprints, created_at, \
                            completed_at, firebase_id, owner_uid, last_modified, is_synced";

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Goal> {
    let status: String = row.get(2)?;
    Ok(Goal {
        id: row.get(0)?,
        title: row.get(1)?,
        status: status_from_sql(2, status)?,
        target_sprints: row.get(3)?,
        created_at: row.get(4)?,
        completed_at: row.get(5)?,
        remote_id: row.get(6)?,
        owner_scope: row.get(7)?,
        last_modified: row.get(8)?,
        is_synced: row.get(9)?,
    })
}

const SPRINT_COLUMNS: &str = "sprint_id, parent_goal_id, task_content, target_duration, \
                              actual_duration, created_at, firebase_id, owner_uid, \
                              last_modified, is_synced";

fn sprint_from_row(row: &Row<'_>) -> rusqlite::Result<SprintRecord> {
    Ok(SprintRecord {
        id: row.get(0)?,
        parent_goal_id: row.get(1)?,
        task_content: row.get(2)?,
        target_duration_secs: row.get(3)?,
        actual_duration_secs: row.get(4)?,
        created_at: row.get(5)?,
        remote_id: row.get(6)?,
        owner_scope: row.get(7)?,
        last_modified: row.get(8)?,
        is_synced: row.get(9)?,
    })
}

fn history_item_from_row(row: &Row<'_>) -> rusqlite::Result<SprintHistoryItem> {
    Ok(SprintHistoryItem {
        record: sprint_from_row(row)?,
        goal_title: row.get(10)?,
    })
}

/// Database operations for goals.
pub struct GoalStore<'a> {
    conn: &'a Connection,
}

impl<'a> GoalStore<'a> {
    /// Create a new goal store.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new goal, letting the store assign the id.
    pub fn insert(&self, goal: &Goal) -> crate::Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO main_goals
                (title, status, total_sprints, created_at, completed_at,
                 firebase_id, owner_uid, last_modified, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                goal.title,
                goal.status.as_str(),
                goal.target_sprints,
                goal.created_at,
                goal.completed_at,
                goal.remote_id,
                goal.owner_scope,
                goal.last_modified,
                goal.is_synced
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a goal by id.
    pub fn get(&self, id: i64) -> crate::Result<Option<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM main_goals WHERE goal_id = ?",
            GOAL_COLUMNS
        ))?;

        let mut rows = stmt.query_map(params![id], goal_from_row)?;
        match rows.next() {
            Some(result) => Ok(Some(result?)),
            None => Ok(None),
        }
    }

    /// List all goals.
    pub fn list(&self) -> crate::Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM main_goals ORDER BY goal_id",
            GOAL_COLUMNS
        ))?;

        let rows = stmt.query_map(params![], goal_from_row)?;
        let mut goals = Vec::new();
        for row in rows {
            goals.push(row?);
        }
        Ok(goals)
    }

    /// The single active goal with its sprint count, in one read.
    ///
    /// One join-and-aggregate statement rather than two round-trips, so the
    /// count cannot be observed inconsistent with the goal row under
    /// concurrent writes.
    pub fn active_with_progress(&self) -> crate::Result<Option<GoalWithProgress>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT g.goal_id, g.title, g.status, g.total_sprints, g.created_at,
                   g.completed_at, g.firebase_id, g.owner_uid, g.last_modified,
                   g.is_synced, COUNT(s.sprint_id) AS completed_sprints
            FROM main_goals g
            LEFT JOIN sprint_records s ON g.goal_id = s.parent_goal_id
            WHERE g.status = 'ACTIVE'
            GROUP BY g.goal_id
            ORDER BY g.created_at DESC
            LIMIT 1
            "#,
        )?;

        let mut rows = stmt.query_map(params![], |row| {
            Ok(GoalWithProgress {
                goal: goal_from_row(row)?,
                completed_sprints: row.get(10)?,
            })
        })?;
        match rows.next() {
            Some(result) => Ok(Some(result?)),
            None => Ok(None),
        }
    }

    /// All goals with their per-goal sprint counts.
    pub fn list_with_sprint_counts(&self) -> crate::Result<Vec<(Goal, i64)>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT g.goal_id, g.title, g.status, g.total_sprints, g.created_at,
                   g.completed_at, g.firebase_id, g.owner_uid, g.last_modified,
                   g.is_synced, COUNT(s.sprint_id) AS completed_sprints
            FROM main_goals g
            LEFT JOIN sprint_records s ON g.goal_id = s.parent_goal_id
            GROUP BY g.goal_id
            ORDER BY g.created_at DESC
            "#,
        )?;

        let rows = stmt.query_map(params![], |row| Ok((goal_from_row(row)?, row.get(10)?)))?;
        let mut goals = Vec::new();
        for row in rows {
            goals.push(row?);
        }
        Ok(goals)
    }

    /// Update a goal's status, stamping the mutation time.
    ///
    /// `completed_at` must be `Some` exactly when the new status is
    /// `Completed`. Returns the number of affected rows.
    pub fn update_status(
        &self,
        id: i64,
        status: GoalStatus,
        completed_at: Option<i64>,
        last_modified: i64,
    ) -> crate::Result<usize> {
        let affected = self.conn.execute(
            r#"
            UPDATE main_goals
            SET status = ?, completed_at = ?, last_modified = ?, is_synced = 0
            WHERE goal_id = ?
            "#,
            params![status.as_str(), completed_at, last_modified, id],
        )?;
        Ok(affected)
    }

    /// Demote every active goal to gave-up, stamping the mutation time.
    pub fn demote_active(&self, last_modified: i64) -> crate::Result<usize> {
        let affected = self.conn.execute(
            r#"
            UPDATE main_goals
            SET status = 'GAVE_UP', last_modified = ?, is_synced = 0
            WHERE status = 'ACTIVE'
            "#,
            params![last_modified],
        )?;
        Ok(affected)
    }

    /// Delete a goal. Sprint rows cascade.
    pub fn delete(&self, id: i64) -> crate::Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM main_goals WHERE goal_id = ?", params![id])?;
        Ok(affected)
    }

    /// Stamp the given owner onto every goal that has none.
    pub fn claim_without_owner(&self, owner_id: &str) -> crate::Result<usize> {
        let affected = self.conn.execute(
            "UPDATE main_goals SET owner_uid = ? WHERE owner_uid IS NULL",
            params![owner_id],
        )?;
        Ok(affected)
    }

    /// List the goals owned by the given scope id.
    pub fn list_by_owner(&self, owner_id: &str) -> crate::Result<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM main_goals WHERE owner_uid = ? ORDER BY goal_id",
            GOAL_COLUMNS
        ))?;

        let rows = stmt.query_map(params![owner_id], goal_from_row)?;
        let mut goals = Vec::new();
        for row in rows {
            goals.push(row?);
        }
        Ok(goals)
    }

    /// Flip the synced flag on every goal owned by the given scope id.
    pub fn mark_synced(&self, owner_id: &str, synced: bool) -> crate::Result<usize> {
        let affected = self.conn.execute(
            "UPDATE main_goals SET is_synced = ? WHERE owner_uid = ?",
            params![synced, owner_id],
        )?;
        Ok(affected)
    }

    /// Delete every goal and bulk-insert the given set, preserving ids.
    ///
    /// Callers are responsible for running this inside a transaction.
    pub fn replace_all(&self, goals: &[Goal]) -> crate::Result<()> {
        self.conn.execute("DELETE FROM main_goals", params![])?;
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO main_goals
                (goal_id, title, status, total_sprints, created_at, completed_at,
                 firebase_id, owner_uid, last_modified, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )?;
        for goal in goals {
            stmt.execute(params![
                goal.id,
                goal.title,
                goal.status.as_str(),
                goal.target_sprints,
                goal.created_at,
                goal.completed_at,
                goal.remote_id,
                goal.owner_scope,
                goal.last_modified,
                goal.is_synced
            ])?;
        }
        Ok(())
    }
}

/// Database operations for sprint records.
pub struct SprintStore<'a> {
    conn: &'a Connection,
}

impl<'a> SprintStore<'a> {
    /// Create a new sprint store.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a new sprint record, letting the store assign the id.
    pub fn insert(&self, record: &SprintRecord) -> crate::Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO sprint_records
                (parent_goal_id, task_content, target_duration, actual_duration,
                 created_at, firebase_id, owner_uid, last_modified, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                record.parent_goal_id,
                record.task_content,
                record.target_duration_secs,
                record.actual_duration_secs,
                record.created_at,
                record.remote_id,
                record.owner_scope,
                record.last_modified,
                record.is_synced
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all sprint records.
    pub fn list(&self) -> crate::Result<Vec<SprintRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sprint_records ORDER BY sprint_id",
            SPRINT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![], sprint_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Count the sprints recorded against the given goal.
    pub fn count_for_goal(&self, goal_id: i64) -> crate::Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM sprint_records WHERE parent_goal_id = ?",
            params![goal_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Sprint history joined with goal titles, newest first.
    pub fn history(&self) -> crate::Result<Vec<SprintHistoryItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.sprint_id, s.parent_goal_id, s.task_content, s.target_duration,
                   s.actual_duration, s.created_at, s.firebase_id, s.owner_uid,
                   s.last_modified, s.is_synced, g.title AS goal_title
            FROM sprint_records s
            LEFT JOIN main_goals g ON s.parent_goal_id = g.goal_id
            ORDER BY s.created_at DESC
            "#,
        )?;

        let rows = stmt.query_map(params![], history_item_from_row)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Sprint history within an inclusive time range, newest first.
    pub fn history_between(
        &self,
        start_ms: i64,
        end_ms: i64,
    ) -> crate::Result<Vec<SprintHistoryItem>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT s.sprint_id, s.parent_goal_id, s.task_content, s.target_duration,
                   s.actual_duration, s.created_at, s.firebase_id, s.owner_uid,
                   s.last_modified, s.is_synced, g.title AS goal_title
            FROM sprint_records s
            LEFT JOIN main_goals g ON s.parent_goal_id = g.goal_id
            WHERE s.created_at BETWEEN ? AND ?
            ORDER BY s.created_at DESC
            "#,
        )?;

        let rows = stmt.query_map(params![start_ms, end_ms], history_item_from_row)?;
        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    /// Stamp the given owner onto every sprint record that has none.
    pub fn claim_without_owner(&self, owner_id: &str) -> crate::Result<usize> {
        let affected = self.conn.execute(
            "UPDATE sprint_records SET owner_uid = ? WHERE owner_uid IS NULL",
            params![owner_id],
        )?;
        Ok(affected)
    }

    /// List the sprint records owned by the given scope id.
    pub fn list_by_owner(&self, owner_id: &str) -> crate::Result<Vec<SprintRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM sprint_records WHERE owner_uid = ? ORDER BY sprint_id",
            SPRINT_COLUMNS
        ))?;

        let rows = stmt.query_map(params![owner_id], sprint_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Flip the synced flag on every sprint record owned by the given scope id.
    pub fn mark_synced(&self, owner_id: &str, synced: bool) -> crate::Result<usize> {
        let affected = self.conn.execute(
            "UPDATE sprint_records SET is_synced = ? WHERE owner_uid = ?",
            params![synced, owner_id],
        )?;
        Ok(affected)
    }

    /// Delete every sprint record and bulk-insert the given set, preserving
    /// ids.
    ///
    /// Callers are responsible for running this inside a transaction, after
    /// the goals the records reference are in place.
    pub fn replace_all(&self, records: &[SprintRecord]) -> crate::Result<()> {
        self.conn.execute("DELETE FROM sprint_records", params![])?;
        let mut stmt = self.conn.prepare(
            r#"
            INSERT INTO sprint_records
                (sprint_id, parent_goal_id, task_content, target_duration,
                 actual_duration, created_at, firebase_id, owner_uid,
                 last_modified, is_synced)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )?;
        for record in records {
            stmt.execute(params![
                record.id,
                record.parent_goal_id,
                record.task_content,
                record.target_duration_secs,
                record.actual_duration_secs,
                record.created_at,
                record.remote_id,
                record.owner_scope,
                record.last_modified,
                record.is_synced
            ])?;
        }
        Ok(())
    }
}
