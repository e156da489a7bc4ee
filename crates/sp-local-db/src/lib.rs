//! SQLite database management for local Sprint Pilot state.
//!
//! This crate provides persistent storage for goals and sprint records using
//! SQLite as the backing database, including forward-only schema migrations
//! and the transactional multi-table operations the sync layer relies on.

pub mod connection;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod store;

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for database operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Duplicate-key or foreign-key violation. A programmer error; callers
    /// must not retry.
    #[error("Constraint violation: {message}")]
    Constraint { message: String },

    /// Storage-medium failure (disk full, corruption). Unrecoverable; callers
    /// must not retry blindly.
    #[error("Storage failure: {message}")]
    Fatal { message: String },

    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Migration error: {message}")]
    Migration { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generic database error: {0}")]
    Generic(String),
}

impl Error {
    /// Create a new constraint-violation error.
    pub fn constraint<S: Into<String>>(message: S) -> Self {
        Self::Constraint {
            message: message.into(),
        }
    }

    /// Create a new migration error.
    pub fn migration<S: Into<String>>(message: S) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// Create a new generic database error.
    pub fn generic<S: Into<String>>(message: S) -> Self {
        Self::Generic(message.into())
    }

    /// Whether this is a storage-medium failure the caller must not retry.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal { .. })
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        use rusqlite::ErrorCode;

        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            match code.code {
                ErrorCode::ConstraintViolation => {
                    return Self::Constraint {
                        message: err.to_string(),
                    }
                }
                ErrorCode::DiskFull
                | ErrorCode::DatabaseCorrupt
                | ErrorCode::NotADatabase
                | ErrorCode::SystemIoFailure
                | ErrorCode::CannotOpen => {
                    return Self::Fatal {
                        message: err.to_string(),
                    }
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Database connection and management.
pub use connection::Database;

/// Per-table stores.
pub use models::{GoalStore, SprintStore};

/// High-level store facade with transactional commands and queries.
pub use store::LocalStore;

/// Schema definitions and constants.
pub use schema::*;
