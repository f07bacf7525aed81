//! Registry of active exam sessions.
//!
//! Presence is a TTL-backed key per session. A session stays live only as
//! long as heartbeats keep arriving; passive expiry is detected by absence,
//! never by notification.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::store::{MemoryStore, StoreError};

const SESSION_PREFIX: &str = "session:";

#[derive(Debug, Error)]
pub enum SessionError {
    /// The session is unknown or its TTL has lapsed. The caller must call
    /// start again; expired sessions are never silently resurrected.
    #[error("Session expired or unknown")]
    Expired,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SessionRegistry {
    store: Arc<MemoryStore>,
    timeout: Duration,
}

impl SessionRegistry {
    pub fn new(store: Arc<MemoryStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    fn key(session_id: &str) -> String {
        format!("{SESSION_PREFIX}{session_id}")
    }

    /// Create or refresh a presence record. Idempotent.
    pub fn start(&self, session_id: &str) -> Result<(), SessionError> {
        self.store
            .set(&Self::key(session_id), "1", Some(self.timeout))?;
        tracing::debug!(session_id = %session_id, "Session started");
        Ok(())
    }

    /// Push the session's expiry forward by the full timeout.
    pub fn heartbeat(&self, session_id: &str) -> Result<(), SessionError> {
        if self.store.refresh(&Self::key(session_id), self.timeout)? {
            Ok(())
        } else {
            Err(SessionError::Expired)
        }
    }

    /// Delete the presence record. Idempotent, no error if already absent.
    pub fn end(&self, session_id: &str) -> Result<(), SessionError> {
        if self.store.delete(&Self::key(session_id))? {
            tracing::debug!(session_id = %session_id, "Session ended");
        }
        Ok(())
    }

    /// All currently live session ids.
    pub fn list_active(&self) -> Result<Vec<String>, SessionError> {
        let mut ids: Vec<String> = self
            .store
            .keys_with_prefix(SESSION_PREFIX)?
            .into_iter()
            .map(|key| key[SESSION_PREFIX.len()..].to_string())
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_registry(timeout: Duration) -> SessionRegistry {
        SessionRegistry::new(Arc::new(MemoryStore::new()), timeout)
    }

    #[test]
    fn start_and_list_active() {
        let registry = setup_registry(Duration::from_secs(900));

        registry.start("abc").unwrap();
        registry.start("def").unwrap();
        registry.start("abc").unwrap(); // idempotent

        assert_eq!(registry.list_active().unwrap(), vec!["abc", "def"]);
    }

    #[test]
    fn heartbeat_extends_liveness() {
        let registry = setup_registry(Duration::from_millis(30));

        registry.start("abc").unwrap();
        std::thread::sleep(Duration::from_millis(20));
        registry.heartbeat("abc").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        // 40ms after start, but only 20ms after the heartbeat: still live.
        assert_eq!(registry.list_active().unwrap(), vec!["abc"]);
    }

    #[test]
    fn heartbeat_after_expiry_fails_without_resurrecting() {
        let registry = setup_registry(Duration::from_millis(5));

        registry.start("abc").unwrap();
        std::thread::sleep(Duration::from_millis(10));

        assert!(matches!(
            registry.heartbeat("abc"),
            Err(SessionError::Expired)
        ));
        assert!(registry.list_active().unwrap().is_empty());
    }

    #[test]
    fn heartbeat_on_unknown_session_fails() {
        let registry = setup_registry(Duration::from_secs(900));
        assert!(matches!(
            registry.heartbeat("never-started"),
            Err(SessionError::Expired)
        ));
    }

    #[test]
    fn ended_sessions_disappear_from_listing() {
        let registry = setup_registry(Duration::from_secs(900));

        registry.start("abc").unwrap();
        registry.end("abc").unwrap();
        registry.end("abc").unwrap(); // idempotent

        assert!(registry.list_active().unwrap().is_empty());
    }

    #[test]
    fn expired_sessions_disappear_from_listing() {
        let registry = setup_registry(Duration::from_millis(5));

        registry.start("abc").unwrap();
        std::thread::sleep(Duration::from_millis(10));

        assert!(registry.list_active().unwrap().is_empty());
    }

    #[test]
    fn restart_after_expiry_creates_a_fresh_session() {
        let registry = setup_registry(Duration::from_millis(5));

        registry.start("abc").unwrap();
        std::thread::sleep(Duration::from_millis(10));
        assert!(registry.heartbeat("abc").is_err());

        registry.start("abc").unwrap();
        assert!(registry.heartbeat("abc").is_ok());
    }
}
