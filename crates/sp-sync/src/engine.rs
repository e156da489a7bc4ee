//! One-shot push/pull synchronization against the remote store.

use std::sync::Arc;

use sp_core::{AuthProvider, ScopeResolver, ScopeRoot, SyncScope};
use sp_local_db::LocalStore;
use sp_remote::{RemoteStore, ScopeDocument};
use tracing::{debug, info, warn};

use crate::run_blocking;

/// Pushes local rows to the remote store and pulls remote rows back, under a
/// last-writer-wins policy at the collection level.
///
/// Push and pull against one scope must not run concurrently; callers
/// serialize them (the background trigger's unique-work policy, and the
/// mutually exclusive user-facing trigger points for pull).
#[derive(Clone)]
pub struct SyncEngine {
    store: LocalStore,
    remote: Arc<dyn RemoteStore>,
    auth: Arc<dyn AuthProvider>,
}

impl SyncEngine {
    /// Create a new sync engine over explicitly injected collaborators.
    pub fn new(
        store: LocalStore,
        remote: Arc<dyn RemoteStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            store,
            remote,
            auth,
        }
    }

    /// The scope to sync under, or `None` when no user is authenticated.
    ///
    /// Derived fresh on every call; auth state can change between calls.
    fn authenticated_scope(&self) -> Option<SyncScope> {
        let scope = ScopeResolver::new(self.auth.clone()).resolve();
        match scope.root {
            ScopeRoot::Users => Some(scope),
            ScopeRoot::Devices => None,
        }
    }

    /// Push every locally owned row to the remote store.
    ///
    /// Claims previously unowned rows for the current scope, overwrites the
    /// whole remote node, and marks the rows synced on success. A failure
    /// propagates to the caller and leaves the local synced flags unchanged.
    /// Without an authenticated user this is a no-op, not an error.
    pub async fn push(&self) -> crate::Result<()> {
        let Some(scope) = self.authenticated_scope() else {
            debug!("push skipped: no authenticated user");
            return Ok(());
        };
        let owner_id = scope.scope_id.clone();
        debug!(scope = %scope.path(), "pushing local data");

        let store = self.store.clone();
        let owner = owner_id.clone();
        let (mut goals, mut sprints) = run_blocking(move || {
            store.claim_unowned(&owner)?;
            Ok(store.owned_by(&owner)?)
        })
        .await?;

        // The document describes the state the rows will be in once this
        // push is acknowledged, so the flag goes out as true.
        for goal in &mut goals {
            goal.is_synced = true;
        }
        for sprint in &mut sprints {
            sprint.is_synced = true;
        }

        let document = ScopeDocument::from_entities(&goals, &sprints);
        debug!(
            scope = %scope.path(),
            goals = document.goals.len(),
            sprints = document.sprints.len(),
            "assembled push document"
        );

        self.remote.put_scope(&scope, &document).await?;

        let store = self.store.clone();
        run_blocking(move || Ok(store.mark_owner_synced(&owner_id, true)?)).await?;

        info!(scope = %scope.path(), "push complete");
        Ok(())
    }

    /// Replace the local collections with the remote node's contents.
    ///
    /// Destructive by design: pull is only invoked right after an explicit
    /// user decision to restore from the cloud, never merged with unrelated
    /// local state. An absent remote node means nothing to pull, a no-op.
    /// Malformed remote records are skipped, not fatal. A fetch or
    /// transaction failure propagates and leaves the store in its pre-pull
    /// state.
    pub async fn pull(&self) -> crate::Result<()> {
        let Some(scope) = self.authenticated_scope() else {
            debug!("pull skipped: no authenticated user");
            return Ok(());
        };
        debug!(scope = %scope.path(), "pulling remote data");

        let Some(document) = self.remote.fetch_scope(&scope).await? else {
            debug!(scope = %scope.path(), "no remote node to pull");
            return Ok(());
        };

        let owner_id = scope.scope_id.clone();
        let mut goals = Vec::with_capacity(document.goals.len());
        for (key, record) in &document.goals {
            match record.to_goal() {
                Some(mut goal) => {
                    goal.owner_scope = Some(owner_id.clone());
                    goal.is_synced = true;
                    goals.push(goal);
                }
                None => warn!(key = %key, "skipping malformed remote goal record"),
            }
        }

        let mut sprints = Vec::with_capacity(document.sprints.len());
        for (key, record) in &document.sprints {
            match record.to_sprint() {
                Some(mut sprint) => {
                    sprint.owner_scope = Some(owner_id.clone());
                    sprint.is_synced = true;
                    sprints.push(sprint);
                }
                None => warn!(key = %key, "skipping malformed remote sprint record"),
            }
        }

        let pulled_goals = goals.len();
        let pulled_sprints = sprints.len();
        let store = self.store.clone();
        run_blocking(move || Ok(store.replace_all(&goals, &sprints)?)).await?;

        info!(
            scope = %scope.path(),
            goals = pulled_goals,
            sprints = pulled_sprints,
            "pull complete"
        );
        Ok(())
    }
}
