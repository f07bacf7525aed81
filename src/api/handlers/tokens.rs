use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{reentry_error, token_error};
use crate::api::response::{ApiError, JSend};
use crate::storage::models::RotationTrigger;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentTokenResponse {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SetTokenRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ValidateTokenRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// Rotate the global token to a freshly generated value.
pub async fn rotate_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<TokenResponse>>, ApiError> {
    let token = state
        .tokens
        .rotate(RotationTrigger::Manual)
        .map_err(token_error)?;

    Ok(JSend::success(TokenResponse { token }))
}

/// Manually override the global token with a supplied value.
pub async fn set_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetTokenRequest>,
) -> Result<Json<JSend<TokenResponse>>, ApiError> {
    let token = state.tokens.set_manual(&req.token).map_err(token_error)?;

    Ok(JSend::success(TokenResponse { token }))
}

pub async fn get_current_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<JSend<CurrentTokenResponse>>, ApiError> {
    let token = state.tokens.current().map_err(token_error)?;

    Ok(JSend::success(CurrentTokenResponse { token }))
}

/// Validate a token presented by an exam client.
///
/// With a `session_id` the candidate is checked against that session's
/// re-entry token and consumed on success; otherwise it is checked against
/// the current/previous global token. Either way the answer is a plain
/// boolean; the caller learns nothing else.
pub async fn validate_token(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ValidateTokenRequest>,
) -> Result<Json<JSend<ValidateTokenResponse>>, ApiError> {
    let is_valid = match &req.session_id {
        Some(session_id) => state
            .reentry
            .validate_and_consume(session_id, &req.token)
            .map_err(reentry_error)?,
        None => state.tokens.validate(&req.token).map_err(token_error)?,
    };

    Ok(JSend::success(ValidateTokenResponse { is_valid }))
}
