use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use crate::{
    ApiClient,
    guards::found,
    identity::{ACCESS_TOKEN_COOKIE, AuthUser, CurrentUser, REFRESH_TOKEN_COOKIE},
    models::{ErrorBody, ResolvedIdentity, SessionData},
};

/// health
///
/// [Public Route] Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = String))
)]
pub async fn health() -> &'static str {
    "ok"
}

/// get_session
///
/// [Public Route] Layout data shared by every page: the identity resolved from
/// the `access_token` cookie, or `null`. Pages and nested guards read the
/// identity from here instead of decoding the cookie themselves.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Resolved session", body = SessionData))
)]
pub async fn get_session(CurrentUser(user): CurrentUser) -> Json<SessionData> {
    Json(SessionData { user })
}

/// login_page
///
/// [Login Route] Placeholder body; only reachable without an access token cookie.
pub async fn login_page() -> &'static str {
    "login"
}

/// get_profile
///
/// [Protected Route] The signed-in user's identity.
#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 200, description = "Current user", body = ResolvedIdentity),
        (status = 302, description = "Not signed in, redirected to /login")
    )
)]
pub async fn get_profile(AuthUser(user): AuthUser) -> Json<ResolvedIdentity> {
    Json(user)
}

/// get_home
///
/// [Protected Route] Landing page data for signed-in users.
pub async fn get_home(AuthUser(user): AuthUser) -> Json<SessionData> {
    Json(SessionData { user: Some(user) })
}

/// logout
///
/// [Protected Route] Ends the session at the identity service, then drops the
/// credential cookies and sends the browser to the login page.
///
/// The upstream call does not touch cookies; clearing them is this handler's job
/// and only happens once the identity service confirmed the logout.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 302, description = "Logged out, redirected to /login"),
        (status = 502, description = "Identity service refused the logout", body = ErrorBody)
    )
)]
pub async fn logout(
    AuthUser(user): AuthUser,
    State(api): State<ApiClient>,
    jar: CookieJar,
) -> Response {
    let access_token = jar
        .get(ACCESS_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .unwrap_or_default();

    match api.logout(&user.id, &access_token).await {
        Ok(()) => {
            let jar = jar
                .remove(Cookie::build(ACCESS_TOKEN_COOKIE).path("/"))
                .remove(Cookie::build(REFRESH_TOKEN_COOKIE).path("/"));
            (jar, found("/login")).into_response()
        }
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorBody {
                message: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}
