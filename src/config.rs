use std::env;

/// AppConfig
///
/// Holds the portal's configuration. Loaded once at startup and shared with
/// handlers through `FromRef`, so it is immutable after `load`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log format and the fail-fast rules below.
    pub env: Env,
    // Base URL of the API gateway (e.g. http://localhost:8080/api). The refresh and
    // logout endpoints are resolved relative to it.
    pub api_base_url: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context. Local gets pretty logs and permissive defaults,
/// Production requires every upstream address to be set explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration for test setup, so tests never depend on
    /// the process environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics in `Env::Production` when `API_BASE_URL` is missing.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => {
                env::var("API_BASE_URL").expect("FATAL: API_BASE_URL must be set in production.")
            }
            Env::Local => {
                env::var("API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            }
        };

        Self {
            env,
            // Trailing slashes are dropped so endpoint paths can always start with '/'.
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }
}
