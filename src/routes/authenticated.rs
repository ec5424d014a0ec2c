use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Pages that require a resolved identity. The whole group is wrapped in the
/// `require_user` guard in `create_router`, so anonymous visitors are redirected
/// to `/login` with a 302 before any handler runs.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /home
        .route("/home", get(handlers::get_home))
        // GET /profile
        // Target of the login page guard when a session already exists.
        .route("/profile", get(handlers::get_profile))
        // POST /logout
        // Ends the session upstream, clears the credential cookies.
        .route("/logout", post(handlers::logout))
}
