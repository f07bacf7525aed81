//! End-to-end integration tests

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use token_warden::config::{Config, NodeConfig, SessionConfig, TokenConfig};
use token_warden::storage::models::RotationTrigger;
use token_warden::storage::Database;
use token_warden::AppState;

fn test_config() -> Config {
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

fn setup_state() -> (Arc<AppState>, TempDir) {
    setup_state_with(test_config())
}

fn setup_state_with(config: Config) -> (Arc<AppState>, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db = Database::open(temp_dir.path()).unwrap();
    (Arc::new(AppState::new(config, db)), temp_dir)
}

#[tokio::test]
async fn test_rotation_with_grace_overlap() {
    let (state, _temp) = setup_state();

    let first = state.tokens.init().unwrap();
    let second = state.tokens.rotate(RotationTrigger::Manual).unwrap();

    // Immediately after rotation both generations validate.
    assert!(state.tokens.validate(&second).unwrap());
    assert!(state.tokens.validate(&first).unwrap());
    assert_eq!(state.tokens.current().unwrap(), Some(second));
}

#[tokio::test]
async fn test_reentry_token_lifecycle() {
    let (state, _temp) = setup_state();
    state.tokens.init().unwrap();

    let issued = state.reentry.issue("session-abc").unwrap();
    assert_eq!(issued.token.len(), 6);

    // First validation consumes; the second must fail.
    assert!(state
        .reentry
        .validate_and_consume("session-abc", &issued.token)
        .unwrap());
    assert!(!state
        .reentry
        .validate_and_consume("session-abc", &issued.token)
        .unwrap());
}

#[tokio::test]
async fn test_reentry_consumption_is_exactly_once_under_concurrency() {
    let (state, _temp) = setup_state();

    let issued = state.reentry.issue("session-abc").unwrap();
    let token = issued.token;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let state = Arc::clone(&state);
        let token = token.clone();
        handles.push(std::thread::spawn(move || {
            state
                .reentry
                .validate_and_consume("session-abc", &token)
                .unwrap()
        }));
    }

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|&consumed| consumed)
        .count();
    assert_eq!(successes, 1);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let (state, _temp) = setup_state();

    state.sessions.start("abc").unwrap();
    state.sessions.start("def").unwrap();
    assert_eq!(state.sessions.list_active().unwrap(), vec!["abc", "def"]);

    state.sessions.heartbeat("abc").unwrap();

    state.sessions.end("abc").unwrap();
    assert_eq!(state.sessions.list_active().unwrap(), vec!["def"]);

    // Ending twice is fine; heartbeating an ended session is not.
    state.sessions.end("abc").unwrap();
    assert!(state.sessions.heartbeat("abc").is_err());
}

#[tokio::test]
async fn test_validation_prefers_session_scope() {
    let (state, _temp) = setup_state();
    let global = state.tokens.init().unwrap();

    state.sessions.start("abc").unwrap();
    let issued = state.reentry.issue("abc").unwrap();

    // The global token does not consume the session's re-entry token.
    assert!(state.tokens.validate(&global).unwrap());
    if global != issued.token {
        assert!(!state
            .reentry
            .validate_and_consume("abc", &global)
            .unwrap());
    }
    assert!(state
        .reentry
        .validate_and_consume("abc", &issued.token)
        .unwrap());
}

#[tokio::test]
async fn test_rotation_broadcasts_to_subscribers() {
    let (state, _temp) = setup_state();
    state.tokens.init().unwrap();

    let mut rx = state.bus.subscribe();
    let token = state.tokens.rotate(RotationTrigger::Scheduled).unwrap();

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.token, token);
}

#[tokio::test]
async fn test_current_token_survives_restart() {
    let temp_dir = TempDir::new().unwrap();

    let token = {
        let db = Database::open(temp_dir.path()).unwrap();
        let state = AppState::new(test_config(), db);
        state.tokens.init().unwrap();
        state.tokens.set_manual("042913").unwrap()
    };

    // Fresh process against the same data dir: ephemeral state is gone but
    // the current token is recovered.
    let db = Database::open(temp_dir.path()).unwrap();
    let state = AppState::new(test_config(), db);
    assert_eq!(state.tokens.init().unwrap(), token);
    assert!(state.tokens.validate(&token).unwrap());
    assert!(state.sessions.list_active().unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_override_validation_errors() {
    let (state, _temp) = setup_state();
    state.tokens.init().unwrap();

    assert!(state.tokens.set_manual("abc123").is_err());
    assert!(state.tokens.set_manual("12345").is_err());
    assert!(state.tokens.set_manual("0423").is_ok());
    assert!(state.tokens.validate("0423").unwrap());
}
