//! Wire records exchanged with the remote store.
//!
//! Every field is optional on the wire. Decoding into a local entity is
//! total for well-formed records and returns `None` when a required field is
//! missing, so one malformed remote record is skipped instead of failing a
//! whole pull.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sp_core::{Goal, GoalStatus};

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// A goal as stored in the remote document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sprints: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_synced: Option<bool>,
}

impl GoalRecord {
    /// Build a wire record from a local goal.
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            goal_id: Some(goal.id),
            title: Some(goal.title.clone()),
            status: Some(goal.status.as_str().to_string()),
            total_sprints: goal.target_sprints,
            created_at: Some(goal.created_at),
            completed_at: goal.completed_at,
            firebase_id: goal.remote_id.clone(),
            owner_uid: goal.owner_scope.clone(),
            last_modified: Some(goal.last_modified),
            is_synced: Some(goal.is_synced),
        }
    }

    /// Decode into a local goal, or `None` when a required field is missing.
    ///
    /// An unknown status string falls back to active; missing timestamps fall
    /// back to now; a missing synced flag is assumed true (the record came
    /// from the remote store, after all).
    pub fn to_goal(&self) -> Option<Goal> {
        let id = self.goal_id?;
        let title = self.title.clone()?;
        let status = self
            .status
            .as_deref()
            .and_then(GoalStatus::from_name)
            .unwrap_or(GoalStatus::Active);
        Some(Goal {
            id,
            title,
            status,
            target_sprints: self.total_sprints,
            created_at: self.created_at.unwrap_or_else(now_millis),
            completed_at: self.completed_at,
            remote_id: self.firebase_id.clone(),
            owner_scope: self.owner_uid.clone(),
            last_modified: self.last_modified.unwrap_or_else(now_millis),
            is_synced: self.is_synced.unwrap_or(true),
        })
    }
}

/// A sprint record as stored in the remote document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SprintRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_goal_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_duration_seconds: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firebase_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_synced: Option<bool>,
}

impl SprintRecord {
    /// Build a wire record from a local sprint record.
    pub fn from_sprint(record: &sp_core::SprintRecord) -> Self {
        Self {
            sprint_id: Some(record.id),
            parent_goal_id: Some(record.parent_goal_id),
            task_content: Some(record.task_content.clone()),
            target_duration_seconds: Some(record.target_duration_secs),
            actual_duration_seconds: Some(record.actual_duration_secs),
            created_at: Some(record.created_at),
            firebase_id: record.remote_id.clone(),
            owner_uid: record.owner_scope.clone(),
            last_modified: Some(record.last_modified),
            is_synced: Some(record.is_synced),
        }
    }

    /// Decode into a local sprint record, or `None` when a required field is
    /// missing.
    pub fn to_sprint(&self) -> Option<sp_core::SprintRecord> {
        Some(sp_core::SprintRecord {
            id: self.sprint_id?,
            parent_goal_id: self.parent_goal_id?,
            task_content: self.task_content.clone()?,
            target_duration_secs: self.target_duration_seconds?,
            actual_duration_secs: self.actual_duration_seconds?,
            created_at: self.created_at?,
            remote_id: self.firebase_id.clone(),
            owner_scope: self.owner_uid.clone(),
            last_modified: self.last_modified.unwrap_or_else(now_millis),
            is_synced: self.is_synced.unwrap_or(true),
        })
    }
}

/// The full document stored under one sync scope:
/// `{"goals": {"<localId>": GoalRecord}, "sprints": {"<localId>": SprintRecord}}`.
///
/// Records are keyed by their stringified local id, which makes the local id
/// double as the remote key: a local row and its remote counterpart are the
/// same logical entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeDocument {
    pub goals: HashMap<String, GoalRecord>,
    pub sprints: HashMap<String, SprintRecord>,
}

impl ScopeDocument {
    /// Assemble the document for a push from local rows.
    pub fn from_entities(goals: &[Goal], sprints: &[sp_core::SprintRecord]) -> Self {
        Self {
            goals: goals
                .iter()
                .map(|g| (g.id.to_string(), GoalRecord::from_goal(g)))
                .collect(),
            sprints: sprints
                .iter()
                .map(|s| (s.id.to_string(), SprintRecord::from_sprint(s)))
                .collect(),
        }
    }

    /// Whether the document holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.goals.is_empty() && self.sprints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_record_round_trip() {
        let mut goal = Goal::new("Read", Some(4));
        goal.id = 1;
        goal.owner_scope = Some("u1".into());

        let record = GoalRecord::from_goal(&goal);
        assert_eq!(record.to_goal(), Some(goal));
    }

    #[test]
    fn test_goal_record_missing_required_field_is_dropped() {
        let record = GoalRecord {
            title: Some("No id".into()),
            ..Default::default()
        };
        assert_eq!(record.to_goal(), None);

        let record = GoalRecord {
            goal_id: Some(1),
            ..Default::default()
        };
        assert_eq!(record.to_goal(), None, "missing title");
    }

    #[test]
    fn test_goal_record_defaults_on_decode() {
        let record = GoalRecord {
            goal_id: Some(1),
            title: Some("Sparse".into()),
            status: Some("NOT_A_STATUS".into()),
            ..Default::default()
        };
        let goal = record.to_goal().unwrap();
        assert_eq!(goal.status, GoalStatus::Active);
        assert!(goal.is_synced);
        assert!(goal.created_at > 0);
    }

    #[test]
    fn test_sprint_record_requires_all_core_fields() {
        let record = SprintRecord {
            sprint_id: Some(2),
            parent_goal_id: Some(1),
            task_content: Some("Review chapter".into()),
            target_duration_seconds: Some(1500),
            actual_duration_seconds: Some(1200),
            created_at: Some(42),
            ..Default::default()
        };
        let sprint = record.to_sprint().unwrap();
        assert_eq!(sprint.id, 2);
        assert!(sprint.is_synced);

        let record = SprintRecord {
            created_at: None,
            ..record
        };
        assert_eq!(record.to_sprint(), None);
    }

    #[test]
    fn test_wire_field_names_are_camel_case() {
        let mut goal = Goal::new("Read", None);
        goal.id = 9;
        let value = serde_json::to_value(GoalRecord::from_goal(&goal)).unwrap();
        assert!(value.get("goalId").is_some());
        assert!(value.get("lastModified").is_some());
        assert!(value.get("isSynced").is_some());
        assert!(value.get("target_sprints").is_none());

        let sprint = sp_core::SprintRecord::new(9, "t", 1500, 900);
        let value = serde_json::to_value(SprintRecord::from_sprint(&sprint)).unwrap();
        assert!(value.get("parentGoalId").is_some());
        assert!(value.get("targetDurationSeconds").is_some());
    }

    #[test]
    fn test_scope_document_keys_by_local_id() {
        let mut goal = Goal::new("Read", None);
        goal.id = 7;
        let doc = ScopeDocument::from_entities(std::slice::from_ref(&goal), &[]);
        assert!(doc.goals.contains_key("7"));
        assert!(doc.sprints.is_empty());
        assert!(!doc.is_empty());
        assert!(ScopeDocument::default().is_empty());
    }
}
