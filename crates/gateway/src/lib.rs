//! HTTP API gateway for ragguard.
//!
//! Exposes:
//! - `POST /login`: username/password for a signed bearer token
//! - `POST /query`: answer a question within the caller's role
//! - `GET /health`: liveness
//!
//! Built on Axum. Every collaborator is constructed once in
//! [`build_state`] and shared read-only across requests.

pub mod api;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router, middleware,
    response::Json,
    routing::{get, post},
};
use ragguard_config::{AppConfig, GatewayConfig};
use ragguard_pipeline::{Pipeline, Services};
use ragguard_security::{
    AuditLogger, AuthGate, InMemoryCredentialStore, PasswordHasher, TokenSigner,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

/// Shared application state for the gateway.
pub struct AppState {
    pub auth: Arc<AuthGate>,
    pub pipeline: Arc<Pipeline>,
    pub audit: Arc<AuditLogger>,
    login_limiter: RateLimiter,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        auth: Arc<AuthGate>,
        pipeline: Arc<Pipeline>,
        audit: Arc<AuditLogger>,
        login_attempts_per_minute: usize,
    ) -> Self {
        Self {
            auth,
            pipeline,
            audit,
            login_limiter: RateLimiter::new(login_attempts_per_minute, Duration::from_secs(60)),
        }
    }

    /// Record a failed login for `username`. Returns `false` once the
    /// failures in the current window exceed the limit.
    ///
    /// Only failures are counted, so guessing at someone's password never
    /// stops them logging in with the right one.
    pub fn record_login_failure(&self, username: &str) -> bool {
        self.login_limiter.check(username)
    }
}

/// Construct the credential store, auth gate, providers, index and pipeline
/// from configuration.
pub fn build_state(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    config.validate()?;
    let signer = TokenSigner::new(config.token_secret()?)?;

    let hasher = PasswordHasher::new()?;
    let store = InMemoryCredentialStore::from_config(&config.auth, &hasher)?;
    if store.is_empty() {
        warn!("No users configured; every login will fail. Add [[auth.users]] or set auth.demo_users");
    }
    let auth = Arc::new(AuthGate::new(Arc::new(store), hasher, signer));

    let services = Services::from_config(config)?;
    info!(services = ?services, "Pipeline services ready");
    let pipeline = Arc::new(Pipeline::new(services));

    Ok(Arc::new(AppState::new(
        auth,
        pipeline,
        Arc::new(AuditLogger::tracing()),
        config.gateway.login_attempts_per_minute,
    )))
}

/// Build the Axum router with all gateway routes.
///
/// Layers applied:
/// - Bearer token authentication on `/query`
/// - CORS for the configured UI origins
/// - Request body size limit
/// - HTTP trace logging
pub fn build_router(state: SharedState, gateway: &GatewayConfig) -> Router {
    let protected = Router::new()
        .route("/query", post(api::query_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .route("/login", post(api::login_handler))
        .merge(protected)
        .with_state(state)
        .layer(DefaultBodyLimit::max(gateway.max_body_bytes))
        .layer(cors_layer(&gateway.allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let state = build_state(&config)?;
    let app = build_router(state, &config.gateway);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Rate Limiter ---

/// Simple in-memory sliding-window rate limiter.
///
/// Tracks attempt timestamps per key. Thread-safe via `std::sync::Mutex`
/// (non-async, held briefly).
struct RateLimiter {
    max_requests: usize,
    window: Duration,
    clients: std::sync::Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Returns `true` and records the attempt if `key` is within its limit.
    fn check(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut clients = self.clients.lock().unwrap_or_else(|e| e.into_inner());

        // Periodic cleanup: if map grows too large, evict stale entries
        if clients.len() > 10_000 {
            clients.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|t| now.duration_since(*t) < self.window)
            });
        }

        let timestamps = clients.entry(key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            return false;
        }

        timestamps.push(now);
        true
    }
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
