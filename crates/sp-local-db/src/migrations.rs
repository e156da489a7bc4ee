//! Database migration management.
//!
//! Migrations are forward-only and versioned. Each version is applied inside
//! its own transaction and recorded in `schema_migrations`, so a reopened
//! database resumes exactly where it left off and re-running against an
//! up-to-date store is a no-op.

use rusqlite::{params, Connection};
use tracing::info;

/// Latest schema version this build understands.
pub const LATEST_VERSION: u32 = crate::schema::SCHEMA_VERSION;

/// Database migration manager.
pub struct MigrationManager;

impl MigrationManager {
    /// Apply all pending migrations to the database.
    pub fn migrate(conn: &Connection) -> crate::Result<()> {
        Self::migrate_to(conn, LATEST_VERSION)
    }

    /// Apply pending migrations up to `target`.
    ///
    /// Exposed so tests can seed a store at an intermediate version before
    /// exercising the rest of the chain. Never runs backward: a store that is
    /// already at `target` is left untouched, and a store beyond it is an
    /// error.
    pub fn migrate_to(conn: &Connection, target: u32) -> crate::Result<()> {
        if target > LATEST_VERSION {
            return Err(crate::Error::migration(format!(
                "unknown schema version {} (latest is {})",
                target, LATEST_VERSION
            )));
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        let current = Self::current_version(conn)?.unwrap_or(0);
        if current > target {
            return Err(crate::Error::migration(format!(
                "database schema is at version {}, which is newer than the requested version {}",
                current, target
            )));
        }

        for version in (current + 1)..=target {
            let tx = conn.unchecked_transaction()?;
            match version {
                1 => Self::apply_migration_1(&tx)?,
                2 => Self::apply_migration_2(&tx)?,
                3 => Self::apply_migration_3(&tx)?,
                _ => unreachable!("version bounded by LATEST_VERSION"),
            }
            tx.execute(
                "INSERT OR REPLACE INTO schema_migrations (version) VALUES (?)",
                params![version],
            )?;
            tx.commit()?;
            info!("Applied schema migration v{}", version);
        }

        Ok(())
    }

    /// Version 1: standalone sprint records, no goal entity yet.
    fn apply_migration_1(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sprint_records (
                sprint_id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_content TEXT NOT NULL,
                target_duration INTEGER NOT NULL,
                actual_duration INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )?;

        Ok(())
    }

    /// Version 2: goals become a first-class entity.
    ///
    /// `sprint_records` is rebuilt with a `parent_goal_id` foreign key. Any
    /// pre-existing sprint rows are reparented to a single synthetic legacy
    /// goal created here (title "Legacy goal", active, created at the
    /// earliest sprint's timestamp); a store with no sprints gets no legacy
    /// goal.
    fn apply_migration_2(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS main_goals (
                goal_id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                total_sprints INTEGER,
                created_at INTEGER NOT NULL,
                completed_at INTEGER
            );

            CREATE TABLE sprint_records_new (
                sprint_id INTEGER PRIMARY KEY AUTOINCREMENT,
                parent_goal_id INTEGER NOT NULL
                    REFERENCES main_goals(goal_id) ON DELETE CASCADE,
                task_content TEXT NOT NULL,
                target_duration INTEGER NOT NULL,
                actual_duration INTEGER NOT NULL,
                created_at INTEGER NOT NULL
            );
            "#,
        )?;

        let orphan_sprints: i64 =
            conn.query_row("SELECT COUNT(*) FROM sprint_records", [], |row| row.get(0))?;

        if orphan_sprints > 0 {
            conn.execute(
                r#"
                INSERT INTO main_goals (title, status, created_at)
                SELECT 'Legacy goal', 'ACTIVE', MIN(created_at) FROM sprint_records
                "#,
                [],
            )?;
            let legacy_goal_id = conn.last_insert_rowid();

            conn.execute(
                r#"
                INSERT INTO sprint_records_new
                    (sprint_id, parent_goal_id, task_content, target_duration,
                     actual_duration, created_at)
                SELECT sprint_id, ?, task_content, target_duration,
                       actual_duration, created_at
                FROM sprint_records
                "#,
                params![legacy_goal_id],
            )?;
        }

        conn.execute_batch(
            r#"
            DROP TABLE sprint_records;
            ALTER TABLE sprint_records_new RENAME TO sprint_records;
            CREATE INDEX IF NOT EXISTS idx_sprint_records_parent_goal_id
                ON sprint_records(parent_goal_id);
            "#,
        )?;

        Ok(())
    }

    /// Version 3: synchronization columns on both tables, zero/default
    /// backfill.
    fn apply_migration_3(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            ALTER TABLE main_goals ADD COLUMN firebase_id TEXT;
            ALTER TABLE main_goals ADD COLUMN owner_uid TEXT;
            ALTER TABLE main_goals ADD COLUMN last_modified INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE main_goals ADD COLUMN is_synced INTEGER NOT NULL DEFAULT 0;

            ALTER TABLE sprint_records ADD COLUMN firebase_id TEXT;
            ALTER TABLE sprint_records ADD COLUMN owner_uid TEXT;
            ALTER TABLE sprint_records ADD COLUMN last_modified INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE sprint_records ADD COLUMN is_synced INTEGER NOT NULL DEFAULT 0;
            "#,
        )?;

        Ok(())
    }

    /// Get the current schema version.
    pub fn current_version(conn: &Connection) -> crate::Result<Option<u32>> {
        let mut stmt = conn.prepare("SELECT MAX(version) FROM schema_migrations")?;

        let version: Option<u32> = stmt.query_row(params![], |row| row.get(0)).ok();

        Ok(version)
    }
}
