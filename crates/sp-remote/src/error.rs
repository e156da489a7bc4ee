//! Error types for the remote store client.

use thiserror::Error;

/// Errors that can occur when talking to the remote store.
///
/// Every variant is a network-class failure from the caller's point of view:
/// push failures are retried by the background trigger and pull failures
/// leave local data stale.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Remote store returned status {status}: {message}")]
    Status {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Remote store unreachable")]
    Offline,

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

/// Result type alias for remote store operations.
pub type RemoteResult<T> = Result<T, RemoteError>;
