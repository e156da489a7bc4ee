//! Tests for the sync engine and the background trigger.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use sp_core::AuthProvider;
use sp_local_db::LocalStore;
use sp_remote::{GoalRecord, MockRemoteStore, RemoteError, RemoteStore, ScopeDocument};
use sp_sync::{Error, RetryPolicy, SyncEngine, SyncScheduler};

/// Auth provider with a settable user, standing in for the external
/// authentication collaborator.
#[derive(Default)]
struct StaticAuth {
    user: Mutex<Option<String>>,
}

impl StaticAuth {
    fn signed_in(user_id: &str) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(Some(user_id.to_string())),
        })
    }

    fn anonymous() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn set_user(&self, user_id: Option<&str>) {
        *self.user.lock().unwrap() = user_id.map(str::to_string);
    }
}

impl AuthProvider for StaticAuth {
    fn is_authenticated(&self) -> bool {
        self.user.lock().unwrap().is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.user.lock().unwrap().clone()
    }
}

fn engine_fixture(
    auth: Arc<StaticAuth>,
) -> (LocalStore, Arc<MockRemoteStore>, SyncEngine) {
    let store = LocalStore::open_in_memory().expect("Failed to open in-memory store");
    let remote = Arc::new(MockRemoteStore::new());
    let engine = SyncEngine::new(
        store.clone(),
        remote.clone() as Arc<dyn RemoteStore>,
        auth,
    );
    (store, remote, engine)
}

#[tokio::test]
async fn test_push_then_pull_round_trips_exactly() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    let goal = store.create_goal("Read a book", Some(4)).unwrap();
    store.record_sprint(goal.id, "Chapter one", 1500, 1500).unwrap();

    engine.push().await.unwrap();

    let node = remote.node("users/u1").expect("remote node written");
    let pushed_goal = node.goals.get(&goal.id.to_string()).expect("goal keyed by local id");
    assert_eq!(pushed_goal.is_synced, Some(true));
    assert_eq!(pushed_goal.owner_uid.as_deref(), Some("u1"));

    let (pushed_goals, pushed_sprints) = store.owned_by("u1").unwrap();
    assert!(pushed_goals.iter().all(|g| g.is_synced));
    assert!(pushed_sprints.iter().all(|s| s.is_synced));

    // Wipe local state, then pull the scope back.
    store.replace_all(&[], &[]).unwrap();
    engine.pull().await.unwrap();

    assert_eq!(store.all_goals().unwrap(), pushed_goals);
    assert_eq!(store.all_sprints().unwrap(), pushed_sprints);
}

#[tokio::test]
async fn test_push_without_authenticated_user_is_a_noop() {
    let (store, remote, engine) = engine_fixture(StaticAuth::anonymous());
    store.create_goal("Offline goal", None).unwrap();

    engine.push().await.unwrap();

    assert!(remote.node("devices/anonymous").is_none());
    assert!(store.all_goals().unwrap().iter().all(|g| !g.is_synced));
}

#[tokio::test]
async fn test_push_failure_propagates_and_leaves_flags_unchanged() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    store.create_goal("Unlucky", None).unwrap();
    remote.set_online(false);

    let err = engine.push().await.unwrap_err();
    assert!(matches!(err, Error::Remote(RemoteError::Offline)));
    assert!(store.all_goals().unwrap().iter().all(|g| !g.is_synced));
}

#[tokio::test]
async fn test_push_respects_auth_changes_between_calls() {
    let auth = StaticAuth::signed_in("u1");
    let (store, remote, engine) = engine_fixture(auth.clone());
    store.create_goal("Flip flop", None).unwrap();

    auth.set_user(None);
    engine.push().await.unwrap();
    assert!(remote.node("users/u1").is_none());

    auth.set_user(Some("u1"));
    engine.push().await.unwrap();
    assert!(remote.node("users/u1").is_some());
}

#[tokio::test]
async fn test_pull_with_no_remote_node_keeps_local_data() {
    let (store, _remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    let goal = store.create_goal("Local only", None).unwrap();

    engine.pull().await.unwrap();

    assert_eq!(store.goal(goal.id).unwrap().unwrap().title, "Local only");
}

#[tokio::test]
async fn test_pull_normalizes_ownership_and_skips_malformed_records() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    store.create_goal("To be replaced", None).unwrap();

    let mut document = ScopeDocument::default();
    document.goals.insert(
        "1".into(),
        GoalRecord {
            goal_id: Some(1),
            title: Some("From the cloud".into()),
            status: Some("COMPLETED".into()),
            created_at: Some(10),
            completed_at: Some(20),
            owner_uid: Some("someone-else".into()),
            last_modified: Some(20),
            is_synced: Some(false),
            ..Default::default()
        },
    );
    // Malformed: no title. Skipped, not fatal.
    document.goals.insert(
        "2".into(),
        GoalRecord {
            goal_id: Some(2),
            ..Default::default()
        },
    );
    document.sprints.insert(
        "1".into(),
        sp_remote::SprintRecord {
            sprint_id: Some(1),
            parent_goal_id: Some(1),
            task_content: Some("Cloud sprint".into()),
            target_duration_seconds: Some(1500),
            actual_duration_seconds: Some(900),
            created_at: Some(15),
            ..Default::default()
        },
    );
    remote.insert_node("users/u1", document);

    engine.pull().await.unwrap();

    let goals = store.all_goals().unwrap();
    assert_eq!(goals.len(), 1, "malformed goal dropped, local goal replaced");
    assert_eq!(goals[0].title, "From the cloud");
    assert_eq!(goals[0].owner_scope.as_deref(), Some("u1"));
    assert!(goals[0].is_synced, "pulled data is in sync by definition");

    let sprints = store.all_sprints().unwrap();
    assert_eq!(sprints.len(), 1);
    assert_eq!(sprints[0].owner_scope.as_deref(), Some("u1"));
    assert!(sprints[0].is_synced);
}

#[tokio::test]
async fn test_pull_failure_leaves_store_in_pre_pull_state() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    let goal = store.create_goal("Still here", None).unwrap();
    remote.set_online(false);

    let err = engine.pull().await.unwrap_err();
    assert!(matches!(err, Error::Remote(RemoteError::Offline)));
    assert_eq!(store.goal(goal.id).unwrap().unwrap().title, "Still here");
}

#[tokio::test]
async fn test_scheduler_drops_new_work_while_push_in_flight() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    store.create_goal("Queued", None).unwrap();
    remote.set_online(false);

    let scheduler = SyncScheduler::new(Arc::new(engine))
        .with_probe_url(None)
        .with_retry_policy(RetryPolicy {
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(20),
            max_attempts: 200,
        });

    assert!(scheduler.schedule_push(), "first request is accepted");
    assert!(!scheduler.schedule_push(), "second request is dropped");

    remote.set_online(true);
    scheduler.wait_idle().await;

    assert!(remote.node("users/u1").is_some());
    let (goals, _) = store.owned_by("u1").unwrap();
    assert!(goals.iter().all(|g| g.is_synced));

    // The slot is free again once the work completed.
    assert!(scheduler.schedule_push());
    scheduler.wait_idle().await;
}

#[tokio::test]
async fn test_scheduler_gives_up_after_exhausting_attempts() {
    let (store, remote, engine) = engine_fixture(StaticAuth::signed_in("u1"));
    store.create_goal("Never synced", None).unwrap();
    remote.set_online(false);

    let scheduler = SyncScheduler::new(Arc::new(engine))
        .with_probe_url(None)
        .with_retry_policy(RetryPolicy {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            max_attempts: 3,
        });

    assert!(scheduler.schedule_push());
    scheduler.wait_idle().await;

    assert!(remote.node("users/u1").is_none());
    assert!(store.all_goals().unwrap().iter().all(|g| !g.is_synced));
}
