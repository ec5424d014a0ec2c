use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Server half: configuration, identity resolution, guards and handlers.
pub mod config;
pub mod guards;
pub mod handlers;
pub mod identity;
pub mod models;

// Client half: credentials, refresh-and-retry fetch, auth endpoints.
pub mod client;
pub mod error;

// Routers grouped by access rule (public, authenticated, login).
pub mod routes;
use routes::{authenticated, login, public};

// --- Public Re-exports ---

pub use client::{ApiClient, ApiRequest, AuthenticatedClient, CredentialService};
pub use config::AppConfig;
pub use error::ClientError;
pub use identity::{AuthUser, CurrentUser};

/// ApiDoc
///
/// OpenAPI document for the portal's JSON endpoints, served at
/// `/api-docs/openapi.json` next to the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::get_session, handlers::get_profile, handlers::logout),
    components(schemas(models::ResolvedIdentity, models::SessionData, models::ErrorBody)),
    tags((name = "session-portal", description = "Session portal"))
)]
struct ApiDoc;

/// AppState
///
/// Shared, cheaply cloneable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Client for the gateway's auth endpoints (logout).
    pub api: ApiClient,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let api = ApiClient::new(reqwest::Client::new(), config.api_base_url.clone());
        Self { api }
    }
}

/// Lets handlers extract `State<ApiClient>` directly.
impl FromRef<AppState> for ApiClient {
    fn from_ref(app_state: &AppState) -> ApiClient {
        app_state.api.clone()
    }
}

/// create_router
///
/// Assembles the portal's routing structure, applies the scoped guards and the
/// global middleware, and registers the application state.
///
/// *Route groups*:
/// - public (`/health`, `/session`, Swagger UI): no guard.
/// - authenticated (`/home`, `/profile`, `POST /logout`): `require_user`, which
///   answers anonymous visitors with `302 Location: /login`.
/// - login (`/login`): `redirect_authenticated`, which sends visitors whose
///   access token resolves to a user on to `/profile`.
///
/// Guards are attached with `route_layer`, so unknown paths still answer 404
/// instead of a redirect.
///
/// *Global layers* (outermost last): a UUID `x-request-id` is set on every
/// request, a tracing span is opened carrying it, the id is echoed on the
/// response, and permissive CORS wraps everything.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // Anonymous visitors are redirected to /login.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn(guards::require_user)),
        )
        // Visitors holding an access token are redirected to /profile.
        .merge(
            login::login_routes().route_layer(middleware::from_fn(guards::redirect_authenticated)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for every request, tagged with the generated `x-request-id` so all log
/// lines of one request correlate.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
