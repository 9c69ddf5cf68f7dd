//!
//! otogift-auth HTTP server
//! ------------------------
//! Axum-based JSON API for the storefront's credential/session lifecycle.
//!
//! Responsibilities:
//! - Registration endpoint backed by the `identity` registration service.
//! - Sign-in/sign-out endpoints with a simple HttpOnly session cookie.
//! - Federated sign-in callback (mounted only when provider credentials
//!   are configured).
//! - Session read endpoint that re-enriches claims from the credential store.
//! - A protected studio endpoint gated by the route guard.

use std::net::SocketAddr;

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::identity::{
    AuthAdapter, FederatedAssertion, GuardDecision, MemoryIdentityStore, RegisterError,
    Registration, RegistrationService, RouteGuard, SessionClaims, SessionManager, SessionStatus,
    SharedStore, SignIn,
};

const SESSION_COOKIE: &str = "otogift_session";

/// Shared server state injected into all handlers.
///
/// Holds the credential store handle, the session table, and the process
/// configuration. The store is the only shared mutable collection; everything
/// else is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub sessions: SessionManager,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionManager::new(config.session_ttl);
        Self { store: MemoryIdentityStore::shared(), sessions, config }
    }
}

/// Build the full route table for the given state. Split out from `run` so
/// integration tests can serve the app on an ephemeral port.
pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/", get(|| async { "otogift-auth ok" }))
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
        .route("/api/studio", get(studio));
    if state.config.federated.is_some() {
        app = app.route("/api/auth/federated/callback", post(federated_callback));
    } else {
        info!(target: "startup", "federated provider credentials absent; federated path disabled");
    }
    app.with_state(state)
}

/// Start the server bound to the configured port.
pub async fn run_with_config(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", config.http_port).parse()?;
    let app = router(AppState::new(config));
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Convenience entry point reading configuration from the environment.
pub async fn run() -> anyhow::Result<()> {
    run_with_config(Config::from_env()).await
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

fn set_session_cookie(token: &str) -> HeaderValue {
    // HttpOnly cookie scoped to path / with SameSite=Strict
    HeaderValue::from_str(&format!("{}={}; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE, token)).unwrap()
}

fn clear_session_cookie() -> HeaderValue {
    HeaderValue::from_str(&format!("{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; Secure; SameSite=Strict; Path=/", SESSION_COOKIE)).unwrap()
}

/// Session status for one request, as the guard sees it. There is no
/// `Loading` on the server side: by the time a request carries (or lacks) a
/// cookie, the status is resolved.
fn session_status(state: &AppState, headers: &HeaderMap) -> SessionStatus {
    match parse_cookie(headers, SESSION_COOKIE).and_then(|t| state.sessions.validate(&t)) {
        Some(claims) => SessionStatus::Authenticated(claims.enriched(&state.store)),
        None => SessionStatus::Unauthenticated,
    }
}

/// Convert a registration failure to the unified error model at the boundary.
fn register_error(err: RegisterError) -> AppError {
    match err {
        RegisterError::Validation(msg) => AppError::user("invalid_input".to_string(), msg),
        RegisterError::Duplicate => AppError::conflict("email_taken", "this email address is already registered"),
        RegisterError::Hashing(e) => AppError::internal("hash_failed".to_string(), e.to_string()),
    }
}

/// Render an `AppError` as the JSON error body. Internals are logged and
/// collapsed to a generic message so details never reach the caller.
fn error_response(err: AppError) -> (StatusCode, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if matches!(err, AppError::Internal { .. }) {
        error!("request failed: {err}");
        return (status, Json(json!({"error": "server error"})));
    }
    (status, Json(json!({"error": err.message()})))
}

#[derive(Debug, Deserialize)]
struct RegisterPayload {
    email: Option<String>,
    password: Option<String>,
    name: Option<String>,
}

async fn register(State(state): State<AppState>, Json(payload): Json<RegisterPayload>) -> impl IntoResponse {
    let (Some(email), Some(password), Some(name)) = (payload.email, payload.password, payload.name) else {
        return error_response(AppError::user("missing_field", "email, password and name are required"));
    };
    let req = Registration { email, password, display_name: name };
    // Hashing is the one slow step; keep it off the request executor.
    let svc = RegistrationService::new(state.store.clone());
    let result = tokio::task::spawn_blocking(move || svc.register(&req)).await;
    match result {
        Ok(Ok(view)) => (
            StatusCode::OK,
            Json(json!({
                "message": "registration successful",
                "user": {"id": view.id, "email": view.email, "name": view.display_name},
            })),
        ),
        Ok(Err(e)) => error_response(register_error(e)),
        Err(e) => error_response(AppError::internal("task_failed".to_string(), e.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    let adapter = AuthAdapter::new(state.store.clone());
    let outcome = tokio::task::spawn_blocking(move || {
        adapter.resolve(SignIn::Credentials { email: payload.email, password: payload.password })
    })
    .await;
    match outcome {
        Ok(Ok(outcome)) => match outcome.resolved() {
            Some(view) => {
                let sess = state.sessions.issue(SessionClaims::for_identity(&view));
                let mut headers = HeaderMap::new();
                headers.insert("Set-Cookie", set_session_cookie(&sess.token));
                (
                    StatusCode::OK,
                    headers,
                    Json(json!({"status": "ok", "user": {"id": view.id, "email": view.email, "name": view.display_name}})),
                )
            }
            // One body for unknown email and wrong password
            None => (StatusCode::UNAUTHORIZED, HeaderMap::new(), Json(json!({"error": "invalid credentials"}))),
        },
        Ok(Err(e)) => {
            error!("login error: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Json(json!({"error": "server error"})))
        }
        Err(e) => {
            error!("login task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Json(json!({"error": "server error"})))
        }
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(token) = parse_cookie(&headers, SESSION_COOKIE) {
        state.sessions.logout(&token);
    }
    let mut h = HeaderMap::new();
    h.insert("Set-Cookie", clear_session_cookie());
    (StatusCode::OK, h, Json(json!({"status": "ok"})))
}

async fn session(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    match session_status(&state, &headers) {
        SessionStatus::Authenticated(claims) => (
            StatusCode::OK,
            Json(json!({"user": {
                "id": claims.identity_id,
                "email": claims.email,
                "name": claims.display_name,
                "avatar_url": claims.avatar_url,
            }})),
        ),
        _ => (StatusCode::OK, Json(json!({"user": null}))),
    }
}

async fn federated_callback(
    State(state): State<AppState>,
    Json(assertion): Json<FederatedAssertion>,
) -> impl IntoResponse {
    let adapter = AuthAdapter::new(state.store.clone());
    match adapter.federated_sign_in(&assertion) {
        Ok(outcome) => match outcome.resolved() {
            Some(view) => {
                let sess = state.sessions.issue(SessionClaims::for_identity(&view));
                let mut headers = HeaderMap::new();
                headers.insert("Set-Cookie", set_session_cookie(&sess.token));
                (
                    StatusCode::OK,
                    headers,
                    Json(json!({"status": "ok", "user": {"id": view.id, "email": view.email, "name": view.display_name}})),
                )
            }
            None => (StatusCode::UNAUTHORIZED, HeaderMap::new(), Json(json!({"error": "invalid credentials"}))),
        },
        Err(e) => {
            error!("federated sign-in error: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Json(json!({"error": "server error"})))
        }
    }
}

/// The music-studio resource: the storefront's canonical protected view.
async fn studio(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    let status = session_status(&state, &headers);
    match (RouteGuard::default().decide(&status), status) {
        (GuardDecision::Content, SessionStatus::Authenticated(claims)) => (
            StatusCode::OK,
            Json(json!({"studio": "ready", "user": {"id": claims.identity_id, "name": claims.display_name}})),
        ),
        // Default sign-in/sign-up prompt; the client renders its own fallback
        // when it has one.
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "sign in required",
                "actions": ["/api/auth/login", "/api/auth/register"],
            })),
        ),
    }
}
