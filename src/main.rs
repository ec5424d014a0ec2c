use session_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point: loads configuration, installs logging, builds
/// the shared state and the router, then serves the portal until the process is
/// stopped.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    // .env is read first so it can feed AppConfig::load(). A production start
    // without API_BASE_URL panics here.
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "session_portal=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    tracing::info!("API gateway at {}", config.api_base_url);

    // 3. State and router
    // The state only carries the gateway client; identity is resolved per
    // request from the cookie.
    let app = create_router(AppState::new(&config));

    // 4. Server startup
    let bind_addr = config.bind_addr;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}
