//! Goal entity and lifecycle status.

/// Status of a goal in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GoalStatus {
    /// The goal is being worked on. At most one goal per owner scope is active.
    Active,
    /// The goal was completed successfully.
    Completed,
    /// The goal was abandoned, either explicitly or by starting a new goal.
    GaveUp,
}

impl GoalStatus {
    /// Stable name used in the database and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "ACTIVE",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::GaveUp => "GAVE_UP",
        }
    }

    /// Parse a status from its stable name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ACTIVE" => Some(GoalStatus::Active),
            "COMPLETED" => Some(GoalStatus::Completed),
            "GAVE_UP" => Some(GoalStatus::GaveUp),
            _ => None,
        }
    }
}

/// A long-running goal that sprints are recorded against.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// Local identifier, assigned by the local store.
    pub id: i64,
    pub title: String,
    pub status: GoalStatus,
    /// Optional target number of sprints for this goal.
    pub target_sprints: Option<i64>,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Completion time, epoch milliseconds. Set iff status is `Completed`.
    pub completed_at: Option<i64>,
    /// Identifier assigned by the remote store. Present for wire
    /// compatibility; the current push/pull protocol keys by local id instead.
    pub remote_id: Option<String>,
    /// Sync scope id that owns this row, stamped on first push.
    pub owner_scope: Option<String>,
    /// Last local mutation time, epoch milliseconds.
    pub last_modified: i64,
    /// False until the remote store has acknowledged this row.
    pub is_synced: bool,
}

impl Goal {
    /// Create a new active, unsynced goal stamped with the current time.
    ///
    /// The id is zero until the local store assigns one on insert.
    pub fn new(title: impl Into<String>, target_sprints: Option<i64>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: 0,
            title: title.into(),
            status: GoalStatus::Active,
            target_sprints,
            created_at: now,
            completed_at: None,
            remote_id: None,
            owner_scope: None,
            last_modified: now,
            is_synced: false,
        }
    }
}

/// A goal together with the number of sprints recorded against it.
///
/// Produced by a single join-and-aggregate read so the count can never be
/// observed inconsistent with the goal row.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalWithProgress {
    pub goal: Goal,
    pub completed_sprints: i64,
}
