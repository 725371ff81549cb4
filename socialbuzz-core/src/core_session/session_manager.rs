/*
    session_manager.rs - Session identity and its durable slot

    At most one identity is active per client instance. The durable slot
    is a single JSON file; an absent slot means an anonymous session, a
    malformed slot is cleared and treated as anonymous.

    Credential matching is plaintext username+secret against the locally
    cached user set, carried over from the backend contract. It lives
    behind this seam only, so a hashed or server-validated scheme can
    replace it without touching the mutation coordinator.
*/

use crate::core_session::errors::{SessionError, SessionResult};
use crate::core_store::model::{User, UserId};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

const SLOT_FILE: &str = "session.json";

/// Durable representation of the bound identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Bound user's id
    pub user_id: UserId,

    /// Bound user's username
    pub username: String,

    /// Friend list as of the last login or friend update
    #[serde(default)]
    pub friends: Vec<UserId>,
}

impl SessionSnapshot {
    /// Snapshot of `user`
    pub fn of(user: &User) -> Self {
        SessionSnapshot {
            user_id: user.id.clone(),
            username: user.username.clone(),
            friends: user.friends.clone(),
        }
    }
}

/// Tracks the current authenticated identity and persists it across
/// process restarts
pub struct SessionManager {
    slot_path: PathBuf,
    current: RwLock<Option<SessionSnapshot>>,
}

impl SessionManager {
    /// Create a session manager whose durable slot lives under
    /// `slot_dir`. The directory is created if missing.
    pub fn new(slot_dir: impl AsRef<Path>) -> SessionResult<Self> {
        let slot_dir = slot_dir.as_ref();
        std::fs::create_dir_all(slot_dir)?;

        Ok(SessionManager {
            slot_path: slot_dir.join(SLOT_FILE),
            current: RwLock::new(None),
        })
    }

    /// Read the durable slot and bind the stored identity if a
    /// well-formed snapshot is present.
    ///
    /// The snapshot is trusted without re-validation against the backend.
    /// A malformed slot is cleared; restore never fails because of slot
    /// contents, only on slot I/O.
    pub async fn restore(&self) -> SessionResult<Option<SessionSnapshot>> {
        counter!("session.restores.total").increment(1);

        let data = match std::fs::read_to_string(&self.slot_path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<SessionSnapshot>(&data) {
            Ok(snapshot) => {
                info!(user_id = %snapshot.user_id, "Session restored from slot");
                *self.current.write().await = Some(snapshot.clone());
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "Malformed session slot, starting anonymous");
                let _ = std::fs::remove_file(&self.slot_path);
                Ok(None)
            }
        }
    }

    /// Scan `users` for an exact username+secret match; bind and persist
    /// on success. A successive login overwrites the previous binding.
    pub async fn login(
        &self,
        users: &[User],
        username: &str,
        secret: &str,
    ) -> SessionResult<SessionSnapshot> {
        let matched = users
            .iter()
            .find(|u| u.username == username && u.password == secret)
            .ok_or(SessionError::InvalidCredentials)?;

        let snapshot = SessionSnapshot::of(matched);
        self.persist(&snapshot)?;
        *self.current.write().await = Some(snapshot.clone());

        counter!("session.logins.total").increment(1);
        info!(user_id = %snapshot.user_id, username = %username, "Session bound");

        Ok(snapshot)
    }

    /// Clear the session and the durable slot
    pub async fn logout(&self) -> SessionResult<()> {
        *self.current.write().await = None;

        match std::fs::remove_file(&self.slot_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the bound snapshot (after a confirmed friend update) and
    /// persist it. No-op when anonymous.
    pub async fn rebind(&self, snapshot: SessionSnapshot) -> SessionResult<()> {
        let mut current = self.current.write().await;
        if current.is_none() {
            return Ok(());
        }

        self.persist(&snapshot)?;
        *current = Some(snapshot);
        Ok(())
    }

    /// Currently bound identity, if any
    pub async fn current(&self) -> Option<SessionSnapshot> {
        self.current.read().await.clone()
    }

    /// Whether a session is bound
    pub async fn is_bound(&self) -> bool {
        self.current.read().await.is_some()
    }

    fn persist(&self, snapshot: &SessionSnapshot) -> SessionResult<()> {
        let data = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.slot_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn users() -> Vec<User> {
        let mut alice = User::new("alice".to_string(), "pw1".to_string());
        alice.friends.push(UserId::new("u-bob".to_string()));
        vec![alice, User::new("bob".to_string(), "pw2".to_string())]
    }

    #[tokio::test]
    async fn test_login_exact_match_binds_session() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        let snapshot = manager.login(&users(), "alice", "pw1").await.unwrap();
        assert_eq!(snapshot.username, "alice");
        assert_eq!(snapshot.friends.len(), 1);
        assert!(manager.is_bound().await);
    }

    #[tokio::test]
    async fn test_login_wrong_secret_leaves_session_unbound() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        let err = manager.login(&users(), "alice", "wrong").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
        assert!(!manager.is_bound().await);
        assert!(manager.current().await.is_none());
    }

    #[tokio::test]
    async fn test_login_unknown_user_gives_same_error() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        let err = manager.login(&users(), "carol", "pw1").await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_restore_roundtrip() {
        let dir = TempDir::new().unwrap();

        let bound = {
            let manager = SessionManager::new(dir.path()).unwrap();
            manager.login(&users(), "alice", "pw1").await.unwrap()
        };

        // New manager instance, same slot directory: simulated restart.
        let manager = SessionManager::new(dir.path()).unwrap();
        let restored = manager.restore().await.unwrap();
        assert_eq!(restored, Some(bound));
        assert!(manager.is_bound().await);
    }

    #[tokio::test]
    async fn test_restore_absent_slot_is_anonymous() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        assert_eq!(manager.restore().await.unwrap(), None);
        assert!(!manager.is_bound().await);
    }

    #[tokio::test]
    async fn test_restore_malformed_slot_is_anonymous_and_cleared() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SLOT_FILE), "{not json at all").unwrap();

        let manager = SessionManager::new(dir.path()).unwrap();
        assert_eq!(manager.restore().await.unwrap(), None);
        assert!(!manager.is_bound().await);

        // The bad slot must not survive to the next start.
        assert!(!dir.path().join(SLOT_FILE).exists());
    }

    #[tokio::test]
    async fn test_successive_logins_overwrite() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        manager.login(&users(), "alice", "pw1").await.unwrap();
        let second = manager.login(&users(), "bob", "pw2").await.unwrap();

        assert_eq!(manager.current().await, Some(second));
    }

    #[tokio::test]
    async fn test_logout_clears_slot() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        manager.login(&users(), "alice", "pw1").await.unwrap();
        manager.logout().await.unwrap();

        assert!(!manager.is_bound().await);
        assert!(!dir.path().join(SLOT_FILE).exists());

        // Logging out while anonymous is a no-op.
        manager.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_rebind_is_noop_when_anonymous() {
        let dir = TempDir::new().unwrap();
        let manager = SessionManager::new(dir.path()).unwrap();

        let snapshot = SessionSnapshot::of(&users()[0]);
        manager.rebind(snapshot).await.unwrap();

        assert!(!manager.is_bound().await);
        assert!(!dir.path().join(SLOT_FILE).exists());
    }
}
