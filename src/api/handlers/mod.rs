mod admin;
mod sessions;
mod tokens;

pub use admin::{admin_purge, health};
pub use sessions::{
    end_session, heartbeat_session, issue_reentry, list_sessions, start_session,
};
pub use tokens::{get_current_token, rotate_token, set_token, validate_token};

use super::response::ApiError;
use crate::sessions::SessionError;
use crate::store::StoreError;
use crate::tokens::{ReentryError, TokenError};

// Failing to reach the store must fail the operation in progress; an
// access-control check never falls back to a default answer.
fn store_error(_: StoreError) -> ApiError {
    ApiError::unavailable("Ephemeral store unavailable")
}

fn token_error(e: TokenError) -> ApiError {
    match e {
        TokenError::InvalidFormat => ApiError::bad_request(e.to_string()),
        TokenError::Store(e) => store_error(e),
        TokenError::Database(e) => ApiError::internal(format!("Failed to persist token: {e}")),
    }
}

fn reentry_error(e: ReentryError) -> ApiError {
    match e {
        ReentryError::Store(e) => store_error(e),
    }
}

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::Expired => ApiError::not_found("Session expired or unknown"),
        SessionError::Store(e) => store_error(e),
    }
}
