//! Shared test helpers — available to all `#[cfg(test)]` modules in the crate.

use std::sync::Arc;

use tempfile::TempDir;

use crate::config::{Config, NodeConfig, SessionConfig, TokenConfig};
use crate::storage::Database;
use crate::AppState;

/// Open a fresh database in a temporary directory.
///
/// Returns both the `Database` and the `TempDir` guard — the caller must
/// keep the `TempDir` alive for the duration of the test.
pub fn setup_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (db, temp_dir)
}

/// A minimal `Config` suitable for unit tests.
pub fn test_config() -> Config {
    Config {
        node: NodeConfig {
            admin_key: "test-admin-key".to_string(),
            bind_address: "127.0.0.1:8080".to_string(),
            data_dir: "/tmp/test".to_string(),
            id: "test-node".to_string(),
        },
        sessions: SessionConfig::default(),
        test_mode: false,
        tokens: TokenConfig::default(),
    }
}

/// Build a full `Arc<AppState>` around a fresh temporary database.
pub fn test_state() -> (Arc<AppState>, TempDir) {
    let (db, temp_dir) = setup_db();
    (Arc::new(AppState::new(test_config(), db)), temp_dir)
}
