//! Local/remote reconciliation for Sprint Pilot.
//!
//! This crate keeps the local store and the remote document store eventually
//! consistent: a one-shot last-writer-wins sync engine, the snapshot vault
//! that protects local data around identity transitions, and the background
//! trigger that retries pushes once connectivity returns.

pub mod engine;
pub mod trigger;
pub mod vault;

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] sp_local_db::Error),

    #[error("Remote store error: {0}")]
    Remote(#[from] sp_remote::RemoteError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic sync error: {0}")]
    Generic(String),
}

impl Error {
    /// Create a new generic sync error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }
}

/// Run store or file I/O on the blocking worker pool, suspending the calling
/// task instead of blocking the runtime.
pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::generic(format!("blocking task failed: {}", e)))?
}

/// One-shot push/pull against the remote store.
pub use engine::SyncEngine;

/// Deferred push with connectivity constraint and unique-work policy.
pub use trigger::{RetryPolicy, SyncScheduler, DEFAULT_PROBE_URL};

/// Side-file backup around identity transitions.
pub use vault::SnapshotVault;
