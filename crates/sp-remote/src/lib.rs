//! Remote document store client for Sprint Pilot sync.
//!
//! This crate defines the wire shape exchanged with the remote store, the
//! `RemoteStore` trait the sync engine is written against, an HTTP
//! implementation for Realtime-Database-style JSON endpoints, and an
//! in-memory mock for tests.

pub mod client;
pub mod error;
pub mod mock;
pub mod wire;

/// Result type for remote store operations.
pub use error::{RemoteError, RemoteResult};

/// Remote store trait and HTTP implementation.
pub use client::{HttpRemoteStore, RemoteStore};

/// In-memory remote store for tests.
pub use mock::MockRemoteStore;

/// Wire records and the per-scope document.
pub use wire::{GoalRecord, ScopeDocument, SprintRecord};
