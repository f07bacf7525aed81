//! Scheduled rotation of the global token.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::storage::models::RotationTrigger;
use crate::AppState;

/// Start the background rotation task.
///
/// Rotates the global token every `ROTATION_INTERVAL_SECONDS`. Startup
/// seeding already installed a token, so the immediate first tick is
/// skipped. Scheduled and manual rotations are both full-replace writes;
/// last writer wins.
pub fn start_rotation_scheduler(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.tokens.rotation_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);
        interval_timer.tick().await;

        loop {
            interval_timer.tick().await;
            match state.tokens.rotate(RotationTrigger::Scheduled) {
                Ok(_) => debug!("Scheduled token rotation complete"),
                Err(e) => error!(error = %e, "Scheduled token rotation failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{setup_db, test_config};

    #[tokio::test(start_paused = true)]
    async fn scheduler_rotates_on_each_interval() {
        let (db, _temp) = setup_db();
        let mut config = test_config();
        config.tokens.rotation_interval_seconds = 30;
        config.tokens.grace_period_seconds = 10;

        let state = Arc::new(AppState::new(config, db));
        state.tokens.init().unwrap();
        let before = state.tokens.current().unwrap();
        let mut rx = state.bus.subscribe();

        let handle = start_rotation_scheduler(Arc::clone(&state));
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(31)).await;
        let event = rx.recv().await.unwrap();

        assert!(state.tokens.validate(&event.token).unwrap());
        assert_eq!(state.tokens.current().unwrap(), Some(event.token));
        // The pre-rotation token sits in its grace window.
        assert!(state.tokens.validate(&before.unwrap()).unwrap());

        handle.abort();
    }
}
