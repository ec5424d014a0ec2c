use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable by anyone, signed in or not. `/session` is the layout
/// data every page loads first; it carries the resolved identity (or `null`)
/// that the guarded groups below depend on.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(handlers::health))
        // GET /session
        // The identity resolved from the access_token cookie, or null.
        .route("/session", get(handlers::get_session))
}
