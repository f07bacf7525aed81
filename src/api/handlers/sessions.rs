use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{reentry_error, session_error};
use crate::api::response::{ApiError, JSend};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize, Serialize)]
pub struct SessionRequest {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionAck {
    pub session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListSessionsResponse {
    pub sessions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReentryResponse {
    pub expires_at: String,
    pub token: String,
}

// ============================================================================
// Session lifecycle handlers
// ============================================================================

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<JSend<SessionAck>>, ApiError> {
    state.sessions.start(&req.session_id).map_err(session_error)?;

    Ok(JSend::success(SessionAck {
        session_id: req.session_id,
    }))
}

/// Extend a live session. A 404 here means the session expired (or never
/// started): the client must call start again, not retry the heartbeat.
pub async fn heartbeat_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<JSend<SessionAck>>, ApiError> {
    state
        .sessions
        .heartbeat(&req.session_id)
        .map_err(session_error)?;

    Ok(JSend::success(SessionAck {
        session_id: req.session_id,
    }))
}

pub async fn end_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Result<Json<JSend<SessionAck>>, ApiError> {
    state.sessions.end(&req.session_id).map_err(session_error)?;

    Ok(JSend::success(SessionAck {
        session_id: req.session_id,
    }))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<ListSessionsResponse>>, ApiError> {
    let sessions = state.sessions.list_active().map_err(session_error)?;

    Ok(JSend::success(ListSessionsResponse { sessions }))
}

// ============================================================================
// Re-entry issuance
// ============================================================================

/// Issue a single-use re-entry token for the session, replacing any
/// unconsumed prior one.
pub async fn issue_reentry(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<JSend<ReentryResponse>>, ApiError> {
    let issued = state.reentry.issue(&session_id).map_err(reentry_error)?;

    Ok(JSend::success(ReentryResponse {
        expires_at: issued.expires_at.to_rfc3339(),
        token: issued.token,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::testutil::test_state;

    #[tokio::test]
    async fn heartbeat_on_unknown_session_maps_to_not_found() {
        let (state, _temp) = test_state();

        let result = heartbeat_session(
            State(state),
            Json(SessionRequest {
                session_id: "never-started".to_string(),
            }),
        )
        .await;

        assert!(matches!(result, Err(ApiError::Fail(StatusCode::NOT_FOUND, _))));
    }

    #[tokio::test]
    async fn issued_reentry_response_carries_token_and_expiry() {
        let (state, _temp) = test_state();

        let Json(resp) = issue_reentry(State(state), Path("abc".to_string()))
            .await
            .unwrap();
        assert_eq!(resp.data.token.len(), 6);
        assert!(!resp.data.expires_at.is_empty());
    }
}
