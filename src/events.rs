//! Broadcast bus for token rotation events.
//!
//! Thin wrapper around [`tokio::sync::broadcast`]: non-blocking publish,
//! bounded ring buffer, fire-and-forget delivery. Publishing with zero
//! subscribers is not an error; a monitor client that connects between two
//! rotations simply waits for the next one. Slow receivers observe
//! `RecvError::Lagged` and skip missed events.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Emitted by the token registry on every rotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenEvent {
    pub token: String,
}

/// Messages pushed to connected monitor clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    /// Sent once per connection, immediately after connect.
    InitialState { token: Option<String> },
    /// Relayed on every rotation of the global token.
    TokenUpdate { token: String },
}

/// Broadcast channel for rotation events.
///
/// Cheap to clone; all clones publish into the same ring buffer.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<TokenEvent>,
}

impl Bus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish an event to all active subscribers. Never blocks; the event
    /// is dropped if nobody is listening.
    pub fn publish(&self, event: TokenEvent) {
        let _ = self.tx.send(event);
    }

    /// A new independent receiver observing only subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<TokenEvent> {
        self.tx.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(64)
    }
}
