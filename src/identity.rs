use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::{guards::found, models::ResolvedIdentity};

/// Cookie holding the session credential.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Cookie holding the refresh credential, only ever removed by the portal.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";

/// Claims
///
/// The part of the access token payload the portal cares about. Every other
/// claim (`exp`, `iat`, ...) is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The user identifier assigned by the identity service.
    pub user_id: String,
}

/// Why a token carried no usable identity. Only ever logged.
#[derive(Debug, thiserror::Error)]
enum TokenDecodeError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not a claims object: {0}")]
    Claims(#[from] serde_json::Error),
}

/// decode_identity
///
/// Optimistically decodes a session token for display purposes. Only the
/// payload segment is read: the JOSE header, the signature and the expiry are
/// never looked at. Expiry is detected by the API answering 401, and
/// authorization is the API's job.
pub fn decode_identity(token: &str) -> Option<ResolvedIdentity> {
    match decode_claims(token) {
        Ok(claims) => Some(ResolvedIdentity {
            id: claims.user_id,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "discarding undecodable access token");
            None
        }
    }
}

fn decode_claims(token: &str) -> Result<Claims, TokenDecodeError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(TokenDecodeError::MissingPayload)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// resolve_identity
///
/// Reads the `access_token` cookie and decodes it. Absent cookie and bad
/// token both resolve to `None`.
pub fn resolve_identity(jar: &CookieJar) -> Option<ResolvedIdentity> {
    jar.get(ACCESS_TOKEN_COOKIE)
        .and_then(|cookie| decode_identity(cookie.value()))
}

/// CurrentUser Extractor
///
/// The resolved identity of the current request, or `None` for anonymous
/// visitors. Extraction never fails.
///
/// The first extraction decodes the cookie and stores the result in the request
/// extensions; later extractors in the same request (guard middleware, then the
/// handler) reuse it, so decoding happens once per request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<ResolvedIdentity>);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(resolved) = parts.extensions.get::<CurrentUser>() {
            return Ok(resolved.clone());
        }

        let jar = CookieJar::from_headers(&parts.headers);
        let current = CurrentUser(resolve_identity(&jar));
        parts.extensions.insert(current.clone());

        Ok(current)
    }
}

/// AuthUser Extractor
///
/// Like `CurrentUser`, but requires an identity. Anonymous requests are
/// rejected with a redirect to the login page.
#[derive(Debug, Clone)]
pub struct AuthUser(pub ResolvedIdentity);

/// Rejection of `AuthUser`: `302 Found` to `/login`.
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        found("/login")
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(CurrentUser(user)) = CurrentUser::from_request_parts(parts, state).await;
        user.map(AuthUser).ok_or(LoginRedirect)
    }
}
