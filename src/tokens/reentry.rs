use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::store::{MemoryStore, StoreError};

use super::generator::generate_numeric_token;

#[derive(Debug, Error)]
pub enum ReentryError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A freshly issued re-entry token.
#[derive(Debug, Clone)]
pub struct IssuedReentry {
    pub expires_at: DateTime<Utc>,
    pub token: String,
}

/// Issues single-use, session-scoped re-entry tokens.
///
/// A device resuming from a locked state presents its session's re-entry
/// token instead of learning the global token. One live token per session:
/// issuing a new one overwrites any unconsumed prior token, so an older
/// leaked value cannot be replayed once a fresh one exists.
pub struct ReentryIssuer {
    store: Arc<MemoryStore>,
    ttl: Duration,
}

impl ReentryIssuer {
    pub fn new(store: Arc<MemoryStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(session_id: &str) -> String {
        format!("reentry:{session_id}")
    }

    /// Issue a new token for the session, replacing any unconsumed one.
    pub fn issue(&self, session_id: &str) -> Result<IssuedReentry, ReentryError> {
        let token = generate_numeric_token();
        self.store
            .set(&Self::key(session_id), &token, Some(self.ttl))?;

        tracing::debug!(session_id = %session_id, "Issued re-entry token");
        Ok(IssuedReentry {
            expires_at: Utc::now()
                + chrono::Duration::from_std(self.ttl).unwrap_or(chrono::Duration::zero()),
            token,
        })
    }

    /// Validate and consume in one atomic step.
    ///
    /// Returns true exactly once per issued token; a mismatch, an expired
    /// token, or an unknown session returns false with no side effects.
    pub fn validate_and_consume(
        &self,
        session_id: &str,
        candidate: &str,
    ) -> Result<bool, ReentryError> {
        let consumed = self.store.take_if_eq(&Self::key(session_id), candidate)?;
        if consumed {
            tracing::debug!(session_id = %session_id, "Consumed re-entry token");
        }
        Ok(consumed)
    }
}
