//! File-backed session authentication.
//!
//! Stands in for the external authentication provider: the session file
//! holds the signed-in user's id and is reread on every query, so the sync
//! layer always sees the live auth state.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sp_core::AuthProvider;

#[derive(Debug, Serialize, Deserialize)]
struct Session {
    user_id: String,
}

/// Auth provider backed by a `session.json` file.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    path: PathBuf,
}

impl SessionAuth {
    /// Create a provider reading and writing the given session file.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Record the given user as signed in.
    pub fn sign_in(&self, user_id: &str) -> Result<()> {
        if user_id.trim().is_empty() {
            bail!("user id must not be blank");
        }
        let session = Session {
            user_id: user_id.to_string(),
        };
        std::fs::write(&self.path, serde_json::to_string(&session)?)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))?;
        Ok(())
    }

    /// Discard the current session, if any.
    pub fn sign_out(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| {
                format!("Failed to remove session file {}", self.path.display())
            }),
        }
    }

    fn read_session(&self) -> Option<String> {
        let json = std::fs::read_to_string(&self.path).ok()?;
        let session: Session = serde_json::from_str(&json).ok()?;
        Some(session.user_id)
    }
}

impl AuthProvider for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.read_session().is_some()
    }

    fn current_user_id(&self) -> Option<String> {
        self.read_session()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let auth = SessionAuth::new(dir.path().join("session.json"));

        assert!(!auth.is_authenticated());
        assert_eq!(auth.current_user_id(), None);

        auth.sign_in("u1").unwrap();
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user_id().as_deref(), Some("u1"));

        auth.sign_out().unwrap();
        assert!(!auth.is_authenticated());

        // Signing out twice is fine.
        auth.sign_out().unwrap();
    }

    #[test]
    fn test_blank_user_id_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let auth = SessionAuth::new(dir.path().join("session.json"));
        assert!(auth.sign_in("   ").is_err());
    }
}
