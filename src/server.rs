//!
//! Resorter360 admin gateway HTTP server
//! -------------------------------------
//! Axum-based HTTP API for the admin back-office authentication core.
//!
//! Responsibilities:
//! - Session management with an opaque HttpOnly cookie.
//! - Login/logout endpoints delegating the credential verdict to the external
//!   Resorter360 identity API.
//! - The per-request authorization gate consulted by every protected route.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::identity::{
    AuthService, Identity, LoginError, LoginRequest, RemoteCredentialDelegate, SessionManager,
};

const SESSION_COOKIE: &str = "resorter_session";

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
}

fn log_startup_env(cfg: &Config) {
    let cwd = std::env::current_dir().ok();
    let exe = std::env::current_exe().ok();
    let user = std::env::var("USER").or_else(|_| std::env::var("USERNAME")).ok();
    info!(
        target: "startup",
        "resorter-admin starting. cwd={:?}, exe={:?}, user={:?}, http_port={}, auth_base={}, auth_timeout_ms={}, session_ttl_secs={}",
        cwd, exe, user, cfg.http_port, cfg.auth_base_url, cfg.auth_timeout.as_millis(), cfg.session_ttl.as_secs()
    );
}

/// Build the application router around an already-constructed AuthService.
/// Split out from `run_with_config` so tests can mount the exact production
/// routes on an ephemeral listener.
pub fn app(auth: Arc<AuthService>) -> Router {
    let state = AppState { auth };
    Router::new()
        .route("/", get(|| async { "resorter-admin ok" }))
        .route("/api/login", get(login))
        .route("/api/logout", get(logout))
        .route("/api/user", get(user))
        .with_state(state)
}

/// Start the gateway bound to the configured port.
pub async fn run_with_config(cfg: Config) -> anyhow::Result<()> {
    log_startup_env(&cfg);

    let delegate = RemoteCredentialDelegate::new(&cfg.auth_base_url, cfg.auth_timeout)?;
    let sessions = SessionManager::with_ttl(cfg.session_ttl);
    let auth = Arc::new(AuthService::new(Arc::new(delegate), sessions));

    let router = app(auth);
    let addr: SocketAddr = format!("0.0.0.0:{}", cfg.http_port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Convenience entry point using environment-derived configuration.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()).await
}

#[derive(Debug, Deserialize)]
struct LoginParams {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie = headers.get("cookie").or_else(|| headers.get("Cookie"))?;
    let s = cookie.to_str().ok()?;
    for part in s.split(';') {
        let p = part.trim();
        if let Some(eq) = p.find('=') {
            let (k, v) = p.split_at(eq);
            if k == name { return Some(v[1..].to_string()); }
        }
    }
    None
}

fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    parse_cookie(headers, SESSION_COOKIE)
}

fn set_session_cookie(token: &str) -> HeaderValue {
    // HttpOnly cookie scoped to path / with SameSite=Strict; carries only the
    // opaque token, never credentials or identity data.
    HeaderValue::from_str(&format!("{}={}; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE, token)).unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE)).unwrap()
}

/// The gate every protected collaborator route must consult before touching
/// business logic: resolves the session cookie to its Identity or rejects.
pub fn require_identity(state: &AppState, headers: &HeaderMap) -> AppResult<Identity> {
    let Some(token) = session_token_from_headers(headers) else {
        return Err(AppError::unauthenticated("no_session", "no session cookie presented"));
    };
    state
        .auth
        .current_identity(&token)
        .ok_or_else(|| AppError::unauthenticated("no_session", "session absent or expired"))
}

fn error_reply(err: AppError) -> (StatusCode, HeaderMap, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, HeaderMap::new(), Json(json!({"error": err.message()})))
}

async fn login(State(state): State<AppState>, Query(params): Query<LoginParams>) -> impl IntoResponse {
    if params.username.is_empty() || params.password.is_empty() {
        return error_reply(AppError::user("missing_credentials", "username and password are required"));
    }
    let req = LoginRequest { username: params.username, password: params.password };
    match state.auth.login(&req).await {
        Ok(resp) => {
            let mut headers = HeaderMap::new();
            headers.insert("Set-Cookie", set_session_cookie(&resp.session.token));
            (StatusCode::OK, headers, Json(json!(resp.identity)))
        }
        Err(LoginError::InvalidCredentials) => {
            error_reply(AppError::auth("invalid_credentials", "Invalid credentials"))
        }
        Err(LoginError::ServiceUnavailable(msg)) => {
            error!("login upstream fault: {msg}");
            error_reply(AppError::unavailable("auth_upstream", "Authentication service unavailable"))
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = session_token_from_headers(&headers) {
        state.auth.logout(&token);
    }
    // Idempotent: no cookie (or an already-dead one) is still a 200.
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (StatusCode::OK, h, Json(json!({"status": "ok"})))
}

async fn user(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match require_identity(&state, &headers) {
        Ok(identity) => (StatusCode::OK, HeaderMap::new(), Json(json!(identity))),
        Err(err) => error_reply(err),
    }
}
