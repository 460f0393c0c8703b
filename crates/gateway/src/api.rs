//! `/login` and `/query` handlers, bearer authentication, and error bodies.
//!
//! Error bodies are `{"detail": "..."}`. Every `401` carries
//! `WWW-Authenticate: Bearer`.

use axum::extract::{Extension, Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Json, Response};
use ragguard_core::error::AuthError;
use ragguard_core::query::{Query, QueryResponse};
use ragguard_core::role::User;
use ragguard_security::{AuditEvent, AuditOutcome};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::SharedState;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error. Please check logs.";

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

pub fn json_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    ApiError {
        status,
        detail: detail.into(),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let unauthorized = self.status == StatusCode::UNAUTHORIZED;
        let mut response = (self.status, Json(ErrorBody { detail: self.detail })).into_response();
        if unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials | AuthError::TokenExpired | AuthError::InvalidToken => {
                json_error(StatusCode::UNAUTHORIZED, e.to_string())
            }
            AuthError::Internal(reason) => {
                error!(reason = %reason, "Authentication backend failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
            }
        }
    }
}

// --- Login ---

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

pub async fn login_handler(
    State(state): State<SharedState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let LoginRequest { username, password } = request;

    // Argon2 is CPU-bound; keep it off the async workers.
    let auth = state.auth.clone();
    let (username, result) = tokio::task::spawn_blocking(move || {
        let result = auth.authenticate(&username, &password);
        (username, result)
    })
    .await
    .map_err(|e| {
        error!(error = %e, "Login task failed");
        json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
    })?;

    let user = match result {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            if !state.record_login_failure(&username) {
                warn!(username = %username, "Login rate limit exceeded");
                state
                    .audit
                    .log(AuditEvent::LoginFailed, &username, AuditOutcome::Denied);
                return Err(json_error(
                    StatusCode::TOO_MANY_REQUESTS,
                    "Too many login attempts",
                ));
            }
            info!(username = %username, "Login failed");
            state
                .audit
                .log(AuditEvent::LoginFailed, &username, AuditOutcome::Failure);
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => return Err(e.into()),
    };

    let issued = state.auth.issue_token(&user)?;
    info!(username = %user.username, role = %user.role, "Login succeeded");
    state
        .audit
        .log(AuditEvent::LoginSucceeded, &user.username, AuditOutcome::Success);

    Ok(Json(LoginResponse {
        access_token: issued.token,
    }))
}

// --- Query ---

/// Bearer authentication for `/query`.
///
/// On success the validated [`User`] is placed in the request extensions.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let Some(token) = token else {
        return Err(json_error(StatusCode::UNAUTHORIZED, "Not authenticated"));
    };

    match state.auth.validate_token(&token) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(kind = %e.kind(), "Bearer token rejected");
            state.audit.log(
                AuditEvent::TokenRejected {
                    reason: e.kind().to_string(),
                },
                "-",
                AuditOutcome::Denied,
            );
            Err(e.into())
        }
    }
}

pub async fn query_handler(
    State(state): State<SharedState>,
    Extension(user): Extension<User>,
    Json(query): Json<Query>,
) -> Result<Json<QueryResponse>, ApiError> {
    let username = user.username.clone();
    let pipeline = state.pipeline.clone();

    // A JoinError here is the only 500 on this route.
    let response = tokio::spawn(async move { pipeline.answer(&query, &user).await })
        .await
        .map_err(|e| {
            error!(error = %e, username = %username, "Query task failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_DETAIL)
        })?;

    state.audit.log(
        AuditEvent::QueryAnswered {
            sources: response.sources.clone(),
        },
        &username,
        AuditOutcome::Success,
    );

    Ok(Json(response))
}
