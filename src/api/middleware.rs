//! Admin authentication middleware
//!
//! Admin routes (rotation, manual override, re-entry issuance, session
//! listing) require the shared admin key in the `x-admin-key` header.
//! Applied only to admin routes; validation and session liveness calls from
//! exam clients stay open.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::response::ApiError;
use crate::AppState;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Reject the request unless it carries the configured admin key.
///
/// An empty configured key locks admin routes entirely rather than leaving
/// them open.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let configured = state.config.node.admin_key.as_str();
    let presented = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|v| v.to_str().ok());

    if !configured.is_empty() && presented == Some(configured) {
        next.run(request).await
    } else {
        ApiError::unauthorized("Missing or invalid admin key").into_response()
    }
}
