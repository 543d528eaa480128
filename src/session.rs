//! The authenticated identity of the running client.
//!
//! One [`SessionStore`] exists per client and is shared by reference with
//! every component that needs the bearer token.

use crate::error::StorageError;
use crate::storage::KeyValueStore;
use crate::token;
use crate::types::Session;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{info, warn};

pub const TOKEN_KEY: &str = "token";
pub const ROLE_KEY: &str = "role";

pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
    state: RwLock<Session>,
    /// Broadcasts whether a session is held.
    authenticated: watch::Sender<bool>,
}

impl SessionStore {
    /// Load any persisted session. Unreadable storage starts empty.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let session = match Self::read_persisted(storage.as_ref()) {
            Ok(session) => session,
            Err(err) => {
                warn!(error = %err, "ignoring unreadable session storage");
                Session::default()
            }
        };
        let (authenticated, _) = watch::channel(!session.is_empty());
        Self {
            storage,
            state: RwLock::new(session),
            authenticated,
        }
    }

    fn read_persisted(storage: &dyn KeyValueStore) -> Result<Session, StorageError> {
        let token = storage.get(TOKEN_KEY)?.unwrap_or_default();
        if token.is_empty() {
            return Ok(Session::default());
        }
        let role = storage.get(ROLE_KEY)?.unwrap_or_default();
        Ok(Session { token, role })
    }

    /// Persist and adopt a session. Nothing changes if persisting fails.
    pub fn login(&self, token: &str, role: &str) -> Result<(), StorageError> {
        self.storage
            .set_many(&[(TOKEN_KEY, token), (ROLE_KEY, role)])?;
        *self.write() = Session {
            token: token.to_string(),
            role: role.to_string(),
        };
        self.authenticated.send_replace(!token.is_empty());
        info!(role = %role, "session established");
        Ok(())
    }

    /// Adopt a token, deriving the role from its claims.
    pub fn login_with_token(&self, token: &str) -> Result<Session, StorageError> {
        let role = token::decode_role(token);
        self.login(token, &role)?;
        Ok(self.current())
    }

    /// Drop the session and wipe all persisted client state.
    ///
    /// The in-memory session is cleared even when storage cannot be wiped.
    pub fn logout(&self) -> Result<(), StorageError> {
        *self.write() = Session::default();
        self.authenticated.send_replace(false);
        info!("session cleared");
        self.storage.clear()
    }

    pub fn current(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        let session = self.read();
        (!session.token.is_empty()).then(|| session.token.clone())
    }

    pub fn role(&self) -> String {
        self.read().role.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.read().is_empty()
    }

    /// Presentation gate for manager-only views.
    pub fn is_manager(&self) -> bool {
        token::is_manager_role(&self.read().role)
    }

    /// Watch for sessions being established or cleared.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.read();
        f.debug_struct("SessionStore")
            .field("authenticated", &!session.is_empty())
            .field("role", &session.role)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    /// Store whose writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set_many(&self, _entries: &[(&str, &str)]) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk full").into())
        }

        fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn starts_empty_without_persisted_state() {
        let store = SessionStore::load(Arc::new(MemoryStore::new()));
        assert!(!store.is_authenticated());
        assert_eq!(store.current(), Session::default());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn login_persists_across_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");

        let store = SessionStore::load(Arc::new(FileStore::new(&path)));
        store.login("tok", "MANAGER").unwrap();
        assert!(store.is_manager());

        let reloaded = SessionStore::load(Arc::new(FileStore::new(&path)));
        assert_eq!(
            reloaded.current(),
            Session {
                token: "tok".to_string(),
                role: "MANAGER".to_string()
            }
        );
    }

    #[test]
    fn failed_persist_leaves_no_session() {
        let store = SessionStore::load(Arc::new(BrokenStore));
        assert!(store.login("tok", "USER").is_err());
        assert!(!store.is_authenticated());
        assert_eq!(store.role(), "");
    }

    #[test]
    fn logout_clears_memory_and_storage() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("session.json");
        let storage = Arc::new(FileStore::new(&path));

        let store = SessionStore::load(storage.clone());
        store.login("tok", "USER").unwrap();
        store.logout().unwrap();

        assert!(!store.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(storage.get(ROLE_KEY).unwrap(), None);

        let fresh = SessionStore::load(Arc::new(FileStore::new(&path)));
        assert!(!fresh.is_authenticated());
    }

    #[test]
    fn malformed_token_logs_in_with_empty_role() {
        let store = SessionStore::load(Arc::new(MemoryStore::new()));
        let session = store.login_with_token("not-a-jwt").unwrap();
        assert_eq!(session.role, "");
        assert!(store.is_authenticated());
        assert!(!store.is_manager());
    }

    #[test]
    fn subscribers_see_login_and_logout() {
        let store = SessionStore::load(Arc::new(MemoryStore::new()));
        let rx = store.subscribe();
        assert!(!*rx.borrow());

        store.login("tok", "USER").unwrap();
        assert!(*rx.borrow());

        store.logout().unwrap();
        assert!(!*rx.borrow());
    }
}
