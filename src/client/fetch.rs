use reqwest::{
    Method, Response,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;

use super::{
    api::{ApiClient, REFRESH_TOKEN_HEADER, is_unauthorized},
    session::CredentialServiceState,
};
use crate::error::ClientError;

/// ApiRequest
///
/// A re-issuable description of an API call. Unlike `reqwest::RequestBuilder`
/// it can be cloned, which the refresh-and-retry path needs.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serializes `body` as the JSON payload and sets the content type.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }
}

/// AuthenticatedClient
///
/// Sends API requests with the stored credentials attached and recovers from an
/// expired access token with a single refresh-and-retry.
#[derive(Clone)]
pub struct AuthenticatedClient {
    api: ApiClient,
    credentials: CredentialServiceState,
}

impl AuthenticatedClient {
    pub fn new(api: ApiClient, credentials: CredentialServiceState) -> Self {
        Self { api, credentials }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn credentials(&self) -> &CredentialServiceState {
        &self.credentials
    }

    /// authenticated_fetch
    ///
    /// 1. Attaches `Authorization: Bearer <access>` and `Refresh_token: <refresh>`
    ///    for whichever credentials are stored. Missing credentials are not an
    ///    error; the request simply goes out without them.
    /// 2. On a 401, asks the credential service for a new access token (one
    ///    refresh exchange at most, shared with concurrent callers).
    /// 3. With a new token, re-issues the request exactly once and returns that
    ///    response, whatever its status. Without one, returns the original 401
    ///    untouched.
    pub async fn authenticated_fetch(&self, request: ApiRequest) -> Result<Response, ClientError> {
        let credentials = self.credentials.current().await?;

        let mut headers = request.headers.clone();
        if let Some(token) = credentials.access_token.as_deref() {
            headers.insert(AUTHORIZATION, bearer(token)?);
        }
        if let Some(refresh) = credentials.refresh_token.as_deref() {
            headers.insert(REFRESH_TOKEN_HEADER, HeaderValue::from_str(refresh)?);
        }

        let response = self.send(&request, headers.clone()).await?;
        if !is_unauthorized(response.status()) {
            return Ok(response);
        }

        tracing::debug!(method = %request.method, path = %request.path, "request unauthorized, refreshing access token");

        let renewed = self
            .credentials
            .renew(credentials.access_token.as_deref(), |refresh| {
                self.api.refresh_access_token(refresh)
            })
            .await?;

        let Some(token) = renewed else {
            return Ok(response);
        };

        headers.insert(AUTHORIZATION, bearer(&token)?);
        self.send(&request, headers).await
    }

    async fn send(&self, request: &ApiRequest, headers: HeaderMap) -> Result<Response, ClientError> {
        let mut builder = self
            .api
            .http()
            .request(request.method.clone(), self.api.url(&request.path))
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        Ok(builder.send().await?)
    }
}

fn bearer(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}
