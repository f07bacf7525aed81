//! token-warden - token coordination service for proctored exam lockdown
//!
//! This crate provides the access-control core for a fleet of exam devices:
//! - Rotating global access token with a grace-period overlap (scheduled +
//!   manual rotation)
//! - Single-use, session-scoped re-entry tokens for resuming from lockdown
//! - Heartbeat-tracked registry of active exam sessions
//! - Real-time WebSocket broadcast of token rotations to monitor clients
//! - redb durable copy of the current token for cold-start recovery
//! - REST API with JSend envelopes

pub mod api;
pub mod config;
pub mod events;
pub mod expiration;
pub mod rotation;
pub mod sessions;
pub mod storage;
pub mod store;
#[cfg(test)]
pub mod testutil;
pub mod tokens;

use std::sync::Arc;
use std::time::Duration;

use config::Config;
use events::Bus;
use sessions::SessionRegistry;
use storage::Database;
use store::MemoryStore;
use tokens::{ReentryIssuer, TokenRegistry};

/// Shared application state
pub struct AppState {
    pub bus: Bus,
    pub config: Config,
    pub db: Database,
    pub reentry: ReentryIssuer,
    pub sessions: SessionRegistry,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenRegistry,
}

impl AppState {
    /// Wire the registries around one shared store, bus, and database.
    pub fn new(config: Config, db: Database) -> Self {
        let store = Arc::new(MemoryStore::new());
        let bus = Bus::default();

        let tokens = TokenRegistry::new(
            Arc::clone(&store),
            db.clone(),
            bus.clone(),
            Duration::from_secs(config.tokens.grace_period_seconds),
        );
        let reentry = ReentryIssuer::new(
            Arc::clone(&store),
            Duration::from_secs(config.tokens.reentry_ttl_seconds),
        );
        let sessions = SessionRegistry::new(
            Arc::clone(&store),
            Duration::from_secs(config.sessions.timeout_seconds),
        );

        Self {
            bus,
            config,
            db,
            reentry,
            sessions,
            store,
            tokens,
        }
    }
}
