//! Synchronization scope derivation.

use std::sync::Arc;

use crate::auth::AuthProvider;

/// Scope id used for data that predates any sign-in.
pub const ANONYMOUS_SCOPE: &str = "anonymous";

/// Top-level partition of the remote store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeRoot {
    /// Data owned by an authenticated user.
    Users,
    /// Data owned by an anonymous device.
    Devices,
}

impl ScopeRoot {
    /// Path segment used in the remote store.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeRoot::Users => "users",
            ScopeRoot::Devices => "devices",
        }
    }
}

/// The partition under which synchronized data is grouped.
///
/// Exactly one scope is active at a time. It is derived from auth state and
/// never stored independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncScope {
    pub root: ScopeRoot,
    pub scope_id: String,
}

impl SyncScope {
    /// Remote store path for this scope, e.g. `users/u1`.
    pub fn path(&self) -> String {
        format!("{}/{}", self.root.as_str(), self.scope_id)
    }
}

/// Derives the active sync scope from auth state.
#[derive(Clone)]
pub struct ScopeResolver {
    auth: Arc<dyn AuthProvider>,
}

impl ScopeResolver {
    /// Create a resolver over the given auth capability.
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self { auth }
    }

    /// Resolve the currently active scope.
    ///
    /// Recomputed on every call: auth state can change between calls, so the
    /// result is never cached.
    pub fn resolve(&self) -> SyncScope {
        let user_id = self.auth.current_user_id();
        match user_id {
            Some(uid) if self.auth.is_authenticated() && !uid.trim().is_empty() => SyncScope {
                root: ScopeRoot::Users,
                scope_id: uid,
            },
            _ => SyncScope {
                root: ScopeRoot::Devices,
                scope_id: ANONYMOUS_SCOPE.to_string(),
            },
        }
    }

    /// The scope id rows are stamped with, e.g. `u1` or `anonymous`.
    pub fn owner_id(&self) -> String {
        self.resolve().scope_id
    }
}
