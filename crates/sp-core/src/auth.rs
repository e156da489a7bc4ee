//! Authentication capability.
//!
//! The actual authentication provider lives outside this subsystem; the sync
//! layer only ever asks whether a user is signed in and who they are. The
//! capability is injected explicitly so components can be constructed without
//! ambient global state.

/// Read-only view of the current authentication state.
///
/// Implementations must answer from the live auth state on every call: the
/// state can change between calls (sign-in, sign-out) and callers never cache
/// the answers.
pub trait AuthProvider: Send + Sync {
    /// Whether a user is currently authenticated.
    fn is_authenticated(&self) -> bool;

    /// The authenticated user's identifier, if any.
    fn current_user_id(&self) -> Option<String>;
}
