use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// ResolvedIdentity
///
/// The minimal user record decoded from the `access_token` cookie. It is derived
/// without signature verification and only drives UI decisions (guards, layout).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ResolvedIdentity {
    // The `user_id` claim of the token, as issued by the identity service.
    pub id: String,
}

/// SessionData
///
/// Layout data handed to every page: the resolved identity, or `null` for
/// anonymous visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionData {
    pub user: Option<ResolvedIdentity>,
}

/// LogoutRequest
///
/// JSON body of `POST /v1/auth/logout`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LogoutRequest {
    pub user_id: String,
}

/// RefreshResponse
///
/// Body of a `POST /v1/auth/refresh-token` response. Only `access_token` is read;
/// the gateway may send other fields alongside it.
#[derive(Debug, Default, Deserialize)]
pub struct RefreshResponse {
    pub access_token: Option<String>,
}

/// ErrorBody
///
/// Error payload shape shared by the identity service and the portal's own
/// failure responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub message: Option<String>,
}
