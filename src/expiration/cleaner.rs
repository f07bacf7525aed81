use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::AppState;

/// Start the background expiration sweeper.
///
/// Expired keys already read as absent; the sweep only reclaims their
/// memory so abandoned sessions and unconsumed re-entry tokens do not
/// accumulate.
pub fn start_expiration_cleaner(state: Arc<AppState>) -> JoinHandle<()> {
    let interval = Duration::from_secs(state.config.sessions.cleanup_interval_seconds);

    tokio::spawn(async move {
        let mut interval_timer = tokio::time::interval(interval);

        loop {
            interval_timer.tick().await;

            match state.store.sweep() {
                Ok(count) if count > 0 => debug!(evicted = count, "Swept expired store entries"),
                Ok(_) => {}
                Err(e) => error!(error = %e, "Expiration sweep failed"),
            }
        }
    })
}
