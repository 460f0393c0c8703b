//! Error types for the ragguard domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! carries the classes the pipeline distinguishes when degrading.

use thiserror::Error;

/// The top-level error type for all ragguard operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Identity ---
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    // --- Retrieval (embedding + vector index) ---
    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    // --- Answer synthesis (completion endpoint) ---
    #[error("Synthesis unavailable: {0}")]
    SynthesisUnavailable(String),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification used in logs and when choosing an HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredentials,
    TokenExpired,
    InvalidToken,
    RetrievalUnavailable,
    SynthesisUnavailable,
    UnexpectedInternal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::TokenExpired => "token_expired",
            Self::InvalidToken => "invalid_token",
            Self::RetrievalUnavailable => "retrieval_unavailable",
            Self::SynthesisUnavailable => "synthesis_unavailable",
            Self::UnexpectedInternal => "unexpected_internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Which error class this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(e) => e.kind(),
            Self::RetrievalUnavailable(_) => ErrorKind::RetrievalUnavailable,
            Self::SynthesisUnavailable(_) => ErrorKind::SynthesisUnavailable,
            Self::Config { .. } | Self::Internal(_) => {
                ErrorKind::UnexpectedInternal
            }
        }
    }
}

// --- Bounded context errors ---

/// Identity failures. The first three surface to callers as "unauthorized"
/// without further detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    /// Hashing or signing machinery failed. Never caused by client input.
    #[error("Authentication backend failure: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::TokenExpired => ErrorKind::TokenExpired,
            Self::InvalidToken => ErrorKind::InvalidToken,
            Self::Internal(_) => ErrorKind::UnexpectedInternal,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Clone, Error)]
pub enum IndexError {
    #[error("Index request failed: {0}")]
    Request(String),

    #[error("Index returned status {status_code}: {message}")]
    Status { status_code: u16, message: String },

    #[error("Malformed index response: {0}")]
    MalformedResponse(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
}
