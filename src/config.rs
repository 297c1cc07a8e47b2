//! Runtime configuration resolved from environment variables.
//! Every knob has a default so a bare `resorter-admin` starts against the
//! production Resorter360 API on the standard port.

use std::time::Duration;

pub const DEFAULT_AUTH_BASE: &str = "https://api.resorter360.ge";
pub const DEFAULT_HTTP_PORT: u16 = 7878;
/// Upstream credential check is hard-bounded; the reference behavior is 5 seconds.
pub const DEFAULT_AUTH_TIMEOUT_MS: u64 = 5_000;
/// Sessions live for 24 hours from creation.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    /// Base URL of the external Resorter360 identity endpoint.
    pub auth_base_url: String,
    pub auth_timeout: Duration,
    pub session_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            auth_base_url: DEFAULT_AUTH_BASE.to_string(),
            auth_timeout: Duration::from_millis(DEFAULT_AUTH_TIMEOUT_MS),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl Config {
    /// Resolve configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let http_port = std::env::var("RESORTER_HTTP_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);
        let auth_base_url = std::env::var("RESORTER_AUTH_BASE")
            .unwrap_or_else(|_| DEFAULT_AUTH_BASE.to_string());
        let auth_timeout_ms = std::env::var("RESORTER_AUTH_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_AUTH_TIMEOUT_MS);
        let session_ttl_secs = std::env::var("RESORTER_SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        Self {
            http_port,
            auth_base_url,
            auth_timeout: Duration::from_millis(auth_timeout_ms),
            session_ttl: Duration::from_secs(session_ttl_secs),
        }
    }
}
