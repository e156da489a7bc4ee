//! Core domain model for Sprint Pilot.
//!
//! This crate defines the goal and sprint entities shared by the local store
//! and the sync engine, the synchronization scope derivation, and the
//! authentication capability consumed by both.

pub mod auth;
pub mod goal;
pub mod scope;
pub mod sprint;

/// Authentication capability consumed by the ownership resolver.
pub use auth::AuthProvider;

/// Goal entity and lifecycle status.
pub use goal::{Goal, GoalStatus, GoalWithProgress};

/// Synchronization scope derivation.
pub use scope::{ScopeResolver, ScopeRoot, SyncScope, ANONYMOUS_SCOPE};

/// Sprint record entity.
pub use sprint::{SprintHistoryItem, SprintRecord};
