use reqwest::{
    StatusCode,
    header::{CONTENT_TYPE, HeaderName, HeaderValue},
};

use crate::{
    error::ClientError,
    models::{ErrorBody, LogoutRequest, RefreshResponse},
};

/// Custom header carrying the refresh credential, both on regular API calls and
/// on the refresh exchange itself.
pub const REFRESH_TOKEN_HEADER: HeaderName = HeaderName::from_static("refresh_token");

pub const REFRESH_PATH: &str = "/v1/auth/refresh-token";
pub const LOGOUT_PATH: &str = "/v1/auth/logout";

/// Message used when a failed logout response carries no readable `message`.
pub const LOGOUT_FALLBACK_MESSAGE: &str = "Logout failed";

/// ApiClient
///
/// Thin wrapper over `reqwest::Client` bound to the API gateway's base URL. It
/// knows the two fixed auth endpoints; everything else goes through
/// `AuthenticatedClient`.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// url
    ///
    /// Resolves a request path. Absolute `http(s)://` URLs pass through, anything
    /// else is appended to the base URL.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// refresh_access_token
    ///
    /// Exchanges the refresh credential for a new access token.
    ///
    /// The body is parsed as JSON before the status is looked at; a body that is
    /// not JSON is an error even on a non-2xx status. A non-2xx status, or a 2xx
    /// without a non-empty `access_token`, yields `Ok(None)`.
    pub async fn refresh_access_token(
        &self,
        refresh_token: Option<String>,
    ) -> Result<Option<String>, ClientError> {
        let refresh_value = HeaderValue::from_str(refresh_token.as_deref().unwrap_or(""))?;

        let response = self
            .http
            .post(self.url(REFRESH_PATH))
            .header(CONTENT_TYPE, "application/json")
            .header(REFRESH_TOKEN_HEADER, refresh_value)
            .send()
            .await?;

        let status = response.status();
        let body = response
            .json::<RefreshResponse>()
            .await
            .map_err(ClientError::RefreshBody)?;

        if !status.is_success() {
            tracing::warn!(%status, "refresh token rejected");
            return Ok(None);
        }

        let token = body.access_token.filter(|token| !token.is_empty());
        if token.is_none() {
            tracing::warn!(%status, "refresh response carried no access token");
        }
        Ok(token)
    }

    /// logout
    ///
    /// Ends the user's session at the identity service. The caller remains
    /// responsible for clearing its own stored credentials.
    ///
    /// Every failure is logged before it is returned.
    pub async fn logout(&self, user_id: &str, access_token: &str) -> Result<(), ClientError> {
        let sent = self
            .http
            .post(self.url(LOGOUT_PATH))
            .bearer_auth(access_token)
            .json(&LogoutRequest {
                user_id: user_id.to_string(),
            })
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, user_id, "logout request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if status.is_success() {
            tracing::info!(user_id, "logged out");
            return Ok(());
        }

        let message = logout_error_message(response).await;
        tracing::error!(%status, %message, user_id, "logout rejected");
        Err(ClientError::Logout { status, message })
    }
}

async fn logout_error_message(response: reqwest::Response) -> String {
    response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message)
        .unwrap_or_else(|| LOGOUT_FALLBACK_MESSAGE.to_string())
}

/// Whether a response means the access token was not accepted.
pub fn is_unauthorized(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED
}
