use axum::{
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::identity::{AuthUser, CurrentUser};

/// found
///
/// Builds a `302 Found` redirect; `axum::response::Redirect` has no 302 constructor.
pub fn found(location: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// require_user
///
/// Guard for the protected route group. The `AuthUser` extractor rejects
/// anonymous requests with a redirect to `/login` before this body runs; a
/// resolved identity lets the request through.
pub async fn require_user(AuthUser(user): AuthUser, request: Request, next: Next) -> Response {
    tracing::trace!(user_id = %user.id, "protected route granted");
    next.run(request).await
}

/// redirect_authenticated
///
/// Guard for the login page, the inverse of `require_user`.
///
/// Redirects to `/profile` only when the `access_token` cookie resolves to a
/// user, not merely when the cookie is present. A present but undecodable
/// cookie is rejected by `require_user` on `/profile`, so redirecting on
/// presence alone would bounce between `/login` and `/profile` forever; such
/// visitors get the login page instead.
pub async fn redirect_authenticated(
    CurrentUser(user): CurrentUser,
    request: Request,
    next: Next,
) -> Response {
    if user.is_some() {
        return found("/profile");
    }
    next.run(request).await
}
