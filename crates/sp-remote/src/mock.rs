//! In-memory remote store for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use sp_core::SyncScope;

use crate::client::RemoteStore;
use crate::error::{RemoteError, RemoteResult};
use crate::wire::ScopeDocument;

/// In-memory `RemoteStore` keyed by scope path.
///
/// `set_online(false)` makes every call fail with `RemoteError::Offline`,
/// which lets tests exercise the retry and failure-propagation paths without
/// a network.
#[derive(Debug, Default)]
pub struct MockRemoteStore {
    nodes: Mutex<HashMap<String, ScopeDocument>>,
    offline: AtomicBool,
}

impl MockRemoteStore {
    /// Create an empty, reachable mock store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated reachability.
    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    /// Read back the document stored under a scope path, e.g. `users/u1`.
    pub fn node(&self, path: &str) -> Option<ScopeDocument> {
        self.nodes.lock().unwrap().get(path).cloned()
    }

    /// Seed a document under a scope path.
    pub fn insert_node(&self, path: impl Into<String>, document: ScopeDocument) {
        self.nodes.lock().unwrap().insert(path.into(), document);
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Offline);
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn put_scope(&self, scope: &SyncScope, document: &ScopeDocument) -> RemoteResult<()> {
        self.check_online()?;
        self.nodes
            .lock()
            .unwrap()
            .insert(scope.path(), document.clone());
        Ok(())
    }

    async fn fetch_scope(&self, scope: &SyncScope) -> RemoteResult<Option<ScopeDocument>> {
        self.check_online()?;
        Ok(self.nodes.lock().unwrap().get(&scope.path()).cloned())
    }
}
