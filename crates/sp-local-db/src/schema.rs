//! Database schema definitions and constants.

// Current schema version
pub const SCHEMA_VERSION: u32 = 3;

// Table names
pub const TABLE_SCHEMA_MIGRATIONS: &str = "schema_migrations";
pub const TABLE_MAIN_GOALS: &str = "main_goals";
pub const TABLE_SPRINT_RECORDS: &str = "sprint_records";

// Column names for main_goals table
pub mod main_goals {
    pub const GOAL_ID: &str = "goal_id";
    pub const TITLE: &str = "title";
    pub const STATUS: &str = "status";
    pub const TOTAL_SPRINTS: &str = "total_sprints";
    pub const CREATED_AT: &str = "created_at";
    pub const COMPLETED_AT: &str = "completed_at";
    pub const FIREBASE_ID: &str = "firebase_id";
    pub const OWNER_UID: &str = "owner_uid";
    pub const LAST_MODIFIED: &str = "last_modified";
    pub const IS_SYNCED: &str = "is_synced";
}

// Column names for sprint_records table
pub mod sprint_records {
    pub const SPRINT_ID: &str = "sprint_id";
    pub const PARENT_GOAL_ID: &str = "parent_goal_id";
    pub const TASK_CONTENT: &str = "task_content";
    pub const TARGET_DURATION: &str = "target_duration";
    pub const ACTUAL_DURATION: &str = "actual_duration";
    pub const CREATED_AT: &str = "created_at";
    pub const FIREBASE_ID: &str = "firebase_id";
    pub const OWNER_UID: &str = "owner_uid";
    pub const LAST_MODIFIED: &str = "last_modified";
    pub const IS_SYNCED: &str = "is_synced";
}
