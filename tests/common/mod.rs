#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{any, post},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use session_portal::identity::Claims;
use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::net::TcpListener;

// --- Token Fixtures ---

pub const TEST_USER_ID: &str = "5f0c7d2e-8a43-4b61-9d7e-2f6a1c3b9e10";

/// Signs a token the way the identity service does. The portal never checks
/// the signature, so any secret works.
pub fn create_token(user_id: &str, secret: &str) -> String {
    let claims = Claims {
        user_id: user_id.to_string(),
    };
    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key).unwrap()
}

// --- Mock Gateway ---

/// How the mock answers `POST /v1/auth/refresh-token`.
#[derive(Clone, Debug)]
pub enum RefreshReply {
    Token(&'static str),
    Rejected,
    NotJson,
    MissingToken,
}

/// How the mock answers `POST /v1/auth/logout`.
#[derive(Clone, Debug)]
pub enum LogoutReply {
    Ok,
    Message(StatusCode, &'static str),
    ErrorField(StatusCode, &'static str),
    Malformed(StatusCode),
}

/// Headers seen by the mock's data endpoint for one call.
#[derive(Clone, Debug, PartialEq)]
pub struct SeenHeaders {
    pub authorization: Option<String>,
    pub refresh_token: Option<String>,
    pub custom: Option<String>,
}

#[derive(Clone)]
pub struct MockGateway {
    /// The only bearer token `/v1/data` accepts.
    pub valid_token: &'static str,
    pub refresh: RefreshReply,
    pub logout: LogoutReply,
    pub calls: Arc<AtomicUsize>,
    pub refresh_calls: Arc<AtomicUsize>,
    pub data_headers: Arc<Mutex<Vec<SeenHeaders>>>,
    pub refresh_headers: Arc<Mutex<Vec<SeenHeaders>>>,
    pub logout_requests: Arc<Mutex<Vec<(Option<String>, serde_json::Value)>>>,
}

impl MockGateway {
    pub fn new(valid_token: &'static str, refresh: RefreshReply) -> Self {
        Self {
            valid_token,
            refresh,
            logout: LogoutReply::Ok,
            calls: Arc::default(),
            refresh_calls: Arc::default(),
            data_headers: Arc::default(),
            refresh_headers: Arc::default(),
            logout_requests: Arc::default(),
        }
    }

    pub fn with_logout(mut self, logout: LogoutReply) -> Self {
        self.logout = logout;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn data_headers(&self) -> Vec<SeenHeaders> {
        self.data_headers.lock().unwrap().clone()
    }

    pub fn refresh_headers(&self) -> Vec<SeenHeaders> {
        self.refresh_headers.lock().unwrap().clone()
    }

    /// Serves the mock on an ephemeral port and returns its base URL.
    pub async fn spawn(self) -> String {
        let router = Router::new()
            .route("/v1/data", any(data))
            .route("/v1/auth/refresh-token", post(refresh))
            .route("/v1/auth/logout", post(logout))
            .with_state(self);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://127.0.0.1:{}", port)
    }
}

fn seen(headers: &HeaderMap) -> SeenHeaders {
    let get = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    SeenHeaders {
        authorization: get("authorization"),
        refresh_token: get("refresh_token"),
        custom: get("x-custom"),
    }
}

async fn data(State(gateway): State<MockGateway>, headers: HeaderMap) -> Response {
    gateway.calls.fetch_add(1, Ordering::SeqCst);
    let seen = seen(&headers);
    let authorized = seen.authorization.as_deref()
        == Some(format!("Bearer {}", gateway.valid_token).as_str());
    gateway.data_headers.lock().unwrap().push(seen);

    if authorized {
        (StatusCode::OK, "payload").into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid token" })),
        )
            .into_response()
    }
}

async fn refresh(State(gateway): State<MockGateway>, headers: HeaderMap) -> Response {
    gateway.calls.fetch_add(1, Ordering::SeqCst);
    gateway.refresh_calls.fetch_add(1, Ordering::SeqCst);
    gateway.refresh_headers.lock().unwrap().push(seen(&headers));

    assert_eq!(
        headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("application/json")
    );

    // Gives concurrent callers time to pile up behind the refresh gate.
    tokio::time::sleep(Duration::from_millis(50)).await;

    match gateway.refresh {
        RefreshReply::Token(token) => {
            (StatusCode::OK, Json(json!({ "access_token": token }))).into_response()
        }
        RefreshReply::Rejected => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid or expired refresh token" })),
        )
            .into_response(),
        RefreshReply::NotJson => (StatusCode::OK, "<html>oops</html>").into_response(),
        RefreshReply::MissingToken => {
            (StatusCode::OK, Json(json!({ "message": "ok" }))).into_response()
        }
    }
}

async fn logout(
    State(gateway): State<MockGateway>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    gateway.calls.fetch_add(1, Ordering::SeqCst);
    gateway
        .logout_requests
        .lock()
        .unwrap()
        .push((seen(&headers).authorization, body));

    match gateway.logout {
        LogoutReply::Ok => (
            StatusCode::OK,
            Json(json!({ "message": "Successfully logged out" })),
        )
            .into_response(),
        LogoutReply::Message(status, message) => {
            (status, Json(json!({ "message": message }))).into_response()
        }
        LogoutReply::ErrorField(status, error) => {
            (status, Json(json!({ "error": error }))).into_response()
        }
        LogoutReply::Malformed(status) => (status, "").into_response(),
    }
}
