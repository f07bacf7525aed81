//! Ephemeral TTL key/value store.
//!
//! Single coordination point for all time-bounded state: the global token
//! pair, per-session re-entry tokens, and session presence records. Every
//! operation takes the lock exactly once, so each call is atomic with
//! respect to concurrent callers. Expired entries are dropped lazily on
//! access and swept periodically by the background cleaner.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// The store lock was poisoned by a panicking writer. Access-control
    /// checks must treat this as fatal rather than failing open.
    #[error("Ephemeral store unavailable: lock poisoned")]
    Unavailable,
}

#[derive(Debug, Clone)]
struct Entry {
    expires_at: Option<Instant>,
    value: String,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-process TTL store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, Entry>>, StoreError> {
        self.entries.lock().map_err(|_| StoreError::Unavailable)
    }

    /// Set a key, replacing any prior value. `None` TTL means the key never
    /// expires on its own.
    pub fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut entries = self.lock()?;
        entries.insert(
            key.to_string(),
            Entry {
                expires_at: ttl.map(|t| Instant::now() + t),
                value: value.to_string(),
            },
        );
        Ok(())
    }

    /// Get a live value. Expired entries are removed and reported as absent.
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    /// Delete a key. Returns whether a live entry was removed.
    pub fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.remove(key) {
            Some(entry) => Ok(!entry.is_expired(now)),
            None => Ok(false),
        }
    }

    /// Extend a live key's TTL. Returns false if the key is absent or
    /// already expired; expired keys are never resurrected.
    pub fn refresh(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(false)
            }
            Some(entry) => {
                entry.expires_at = Some(now + ttl);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Compare-and-delete in a single lock hold: removes the key and returns
    /// true iff a live entry exists and its value equals `expected`. Under
    /// concurrent attempts with the same candidate, exactly one succeeds.
    pub fn take_if_eq(&self, key: &str, expected: &str) -> Result<bool, StoreError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                Ok(false)
            }
            Some(entry) if entry.value == expected => {
                entries.remove(key);
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }

    /// List live keys starting with `prefix`. O(n) over live keys, which is
    /// fine at exam-class cardinalities.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.lock()?;
        let now = Instant::now();

        Ok(entries
            .iter()
            .filter(|(key, entry)| key.starts_with(prefix) && !entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect())
    }

    /// Evict every expired entry. Returns the number evicted.
    pub fn sweep(&self) -> Result<usize, StoreError> {
        let mut entries = self.lock()?;
        let now = Instant::now();

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        Ok(before - entries.len())
    }

    /// Number of entries currently held, expired ones included until the
    /// next sweep touches them.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.lock()?.is_empty())
    }

    /// Remove everything, live or not. Test-mode purge only.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let mut entries = self.lock()?;
        let count = entries.len();
        entries.clear();
        Ok(count)
    }
}
