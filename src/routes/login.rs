use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Login Router Module
///
/// The login page. Wrapped in the `redirect_authenticated` guard, which sends
/// visitors whose access token cookie resolves to a user to `/profile`.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", get(handlers::login_page))
}
