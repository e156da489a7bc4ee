//! Sprint record entity.

/// A single completed focus sprint, recorded against a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintRecord {
    /// Local identifier, assigned by the local store.
    pub id: i64,
    /// Owning goal. Deleting the goal deletes its sprints.
    pub parent_goal_id: i64,
    /// What the user worked on during the sprint.
    pub task_content: String,
    /// Planned sprint length in seconds, always positive.
    pub target_duration_secs: i64,
    /// Time actually spent, in `1..=target_duration_secs`.
    pub actual_duration_secs: i64,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Identifier assigned by the remote store. Unused by the current
    /// push/pull protocol, which keys by local id.
    pub remote_id: Option<String>,
    /// Sync scope id that owns this row, stamped on first push.
    pub owner_scope: Option<String>,
    /// Last local mutation time, epoch milliseconds.
    pub last_modified: i64,
    /// False until the remote store has acknowledged this row.
    pub is_synced: bool,
}

impl SprintRecord {
    /// Create a new unsynced sprint record stamped with the current time.
    ///
    /// The id is zero until the local store assigns one on insert.
    pub fn new(
        parent_goal_id: i64,
        task_content: impl Into<String>,
        target_duration_secs: i64,
        actual_duration_secs: i64,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: 0,
            parent_goal_id,
            task_content: task_content.into(),
            target_duration_secs,
            actual_duration_secs,
            created_at: now,
            remote_id: None,
            owner_scope: None,
            last_modified: now,
            is_synced: false,
        }
    }
}

/// A sprint record joined with the title of its goal, for history views.
#[derive(Debug, Clone, PartialEq)]
pub struct SprintHistoryItem {
    pub record: SprintRecord,
    /// Title of the owning goal, if it still exists.
    pub goal_title: Option<String>,
}
