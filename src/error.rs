use reqwest::StatusCode;
use thiserror::Error;

/// Failure modes of the API client half of the crate.
///
/// A rejected refresh has no variant; the fetch wrapper recovers from it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The refresh endpoint answered with a body that is not JSON.
    #[error("refresh response is not valid JSON: {0}")]
    RefreshBody(#[source] reqwest::Error),

    #[error("credential cannot be sent as a header value")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("credential store unavailable: {0}")]
    Store(#[from] std::io::Error),

    #[error("credential store is corrupt: {0}")]
    StoreFormat(#[from] serde_json::Error),

    /// Logout rejected by the identity service. Displays exactly the server's message.
    #[error("{message}")]
    Logout { status: StatusCode, message: String },
}
