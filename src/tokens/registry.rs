use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::events::{Bus, TokenEvent};
use crate::storage::models::{RotationTrigger, TokenSnapshot};
use crate::storage::{Database, DatabaseError};
use crate::store::{MemoryStore, StoreError};

use super::generator::{generate_numeric_token, is_valid_manual_token};

/// Store key holding the current global token (no TTL).
pub const CURRENT_KEY: &str = "token:current";
/// Store key holding the previous token; its TTL is the grace period.
pub const PREVIOUS_KEY: &str = "token:previous";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
    #[error("Invalid token format: expected a 4- or 6-digit numeric string")]
    InvalidFormat,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Owns the rotating global access token.
///
/// All reads and writes go through the ephemeral store, so concurrent
/// validation requests, the rotation scheduler, and manual admin rotations
/// coordinate on the same atomic primitives. Rotation fully replaces both
/// the current and previous values; a reader racing a rotation only ever
/// observes a superset of valid tokens.
pub struct TokenRegistry {
    bus: Bus,
    db: Database,
    grace_period: Duration,
    store: Arc<MemoryStore>,
}

impl TokenRegistry {
    pub fn new(store: Arc<MemoryStore>, db: Database, bus: Bus, grace_period: Duration) -> Self {
        Self {
            bus,
            db,
            grace_period,
            store,
        }
    }

    /// Seed the store on process start.
    ///
    /// Recovers the current token from durable storage when one exists
    /// (without publishing an event: no rotation happened), otherwise
    /// rotates immediately so validation never observes an unset state past
    /// the startup window.
    pub fn init(&self) -> Result<String, TokenError> {
        match self.db.get_current_token()? {
            Some(snapshot) => {
                self.store.set(CURRENT_KEY, &snapshot.value, None)?;
                tracing::info!("Recovered global token from durable storage");
                Ok(snapshot.value)
            }
            None => self.rotate(RotationTrigger::Scheduled),
        }
    }

    /// Rotate to a freshly generated token. Returns the new token.
    pub fn rotate(&self, trigger: RotationTrigger) -> Result<String, TokenError> {
        let token = generate_numeric_token();
        self.install(&token, trigger)?;
        Ok(token)
    }

    /// Install an externally supplied token value (admin manual override).
    pub fn set_manual(&self, token: &str) -> Result<String, TokenError> {
        if !is_valid_manual_token(token) {
            return Err(TokenError::InvalidFormat);
        }
        self.install(token, RotationTrigger::Manual)?;
        Ok(token.to_string())
    }

    /// The current global token, or `None` if never initialized.
    pub fn current(&self) -> Result<Option<String>, TokenError> {
        Ok(self.store.get(CURRENT_KEY)?)
    }

    /// True iff the candidate equals the current token, or the previous
    /// token within its grace window. The store's TTL enforces the window.
    pub fn validate(&self, candidate: &str) -> Result<bool, TokenError> {
        if self.store.get(CURRENT_KEY)?.as_deref() == Some(candidate) {
            return Ok(true);
        }
        Ok(self.store.get(PREVIOUS_KEY)?.as_deref() == Some(candidate))
    }

    /// Replace the token pair: prior current becomes previous (grace TTL),
    /// the new value becomes current, the durable copy is re-synced, and an
    /// update event is published.
    fn install(&self, value: &str, trigger: RotationTrigger) -> Result<(), TokenError> {
        if let Some(prior) = self.store.get(CURRENT_KEY)? {
            self.store
                .set(PREVIOUS_KEY, &prior, Some(self.grace_period))?;
        }
        self.store.set(CURRENT_KEY, value, None)?;

        self.db.put_current_token(&TokenSnapshot {
            rotated_at: Utc::now(),
            trigger,
            value: value.to_string(),
        })?;

        self.bus.publish(TokenEvent {
            token: value.to_string(),
        });

        tracing::info!(trigger = ?trigger, "Rotated global access token");
        Ok(())
    }
}
