use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::middleware::require_admin;
use super::ws;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Admin routes -- gated behind the shared admin key
    let mut admin_routes = Router::new()
        .route("/tokens/rotate", post(handlers::rotate_token))
        .route("/tokens/current", get(handlers::get_current_token))
        .route("/tokens/current", put(handlers::set_token))
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/:id/reentry", post(handlers::issue_reentry));

    // Test-only routes -- dangerous operations gated behind TEST_MODE
    if state.config.test_mode {
        tracing::warn!("Test mode enabled — purge route is available.");
        admin_routes = admin_routes.route("/admin/purge", delete(handlers::admin_purge));
    }

    let admin_routes = admin_routes.route_layer(middleware::from_fn_with_state(
        Arc::clone(&state),
        require_admin,
    ));

    // Client routes -- called by exam devices, no admin key
    let client_routes = Router::new()
        .route("/tokens/validate", post(handlers::validate_token))
        .route("/sessions/start", post(handlers::start_session))
        .route("/sessions/heartbeat", post(handlers::heartbeat_session))
        .route("/sessions/end", post(handlers::end_session))
        .route("/ws", get(ws::ws_handler));

    let internal_routes = Router::new().route("/_internal/health", get(handlers::health));

    Router::new()
        .merge(admin_routes)
        .merge(client_routes)
        .merge(internal_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
