//! Configuration loading, validation, and management for ragguard.
//!
//! Loads configuration from `~/.ragguard/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use ragguard_core::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.ragguard/config.toml`.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Identity tokens and user accounts
    #[serde(default)]
    pub auth: AuthConfig,

    /// Completion endpoint used for answer synthesis
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Embedding endpoint used for query embeddings
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Vector index connection
    #[serde(default)]
    pub index: IndexConfig,

    /// Retrieval and context limits
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("gateway", &self.gateway)
            .field("auth", &self.auth)
            .field("completion", &self.completion)
            .field("embedding", &self.embedding)
            .field("index", &self.index)
            .field("pipeline", &self.pipeline)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Browser origins allowed to call the API (the chat UI).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Failed login attempts per username per minute before `/login`
    /// answers 429. A correct password is never refused.
    #[serde(default = "default_login_attempts")]
    pub login_attempts_per_minute: usize,

    /// Maximum accepted request body size.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}
fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8501".into()]
}
fn default_login_attempts() -> usize {
    10
}
fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: default_allowed_origins(),
            login_attempts_per_minute: default_login_attempts(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign identity tokens. Required to serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_secret: Option<String>,

    /// Load the six built-in demo accounts (`finance_user/finance_pass`, ...).
    #[serde(default)]
    pub demo_users: bool,

    /// Configured accounts.
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &redact(&self.token_secret))
            .field("demo_users", &self.demo_users)
            .field("users", &self.users)
            .finish()
    }
}

/// One account in `[[auth.users]]`.
#[derive(Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,

    /// Argon2 PHC string, e.g. from `ragguard hash-password`.
    pub password_hash: String,

    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("department", &self.department)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Provider name: "groq", "openai", "openrouter", "ollama", or any
    /// OpenAI-compatible endpoint given via `api_url`.
    #[serde(default = "default_completion_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_completion_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_completion_provider() -> String {
    "groq".into()
}
fn default_completion_model() -> String {
    "llama3-8b-8192".into()
}
fn default_temperature() -> f32 {
    0.3
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            provider: default_completion_provider(),
            api_url: None,
            api_key: None,
            model: default_completion_model(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_embedding_provider() -> String {
    "openai".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            api_url: None,
            api_key: None,
            model: default_embedding_model(),
        }
    }
}

impl std::fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .finish()
    }
}

/// Which Chroma HTTP API the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChromaApiVersion {
    /// `/api/v1/collections/...` (Chroma before 0.6).
    V1,
    /// `/api/v2/tenants/{tenant}/databases/{database}/collections/...`.
    V2,
}

/// Connection to the Chroma server holding the document embeddings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_url")]
    pub url: String,

    #[serde(default = "default_api_version")]
    pub api_version: ChromaApiVersion,

    /// Ignored by the v1 API.
    #[serde(default = "default_tenant")]
    pub tenant: String,

    /// Ignored by the v1 API.
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_index_url() -> String {
    "http://localhost:8001".into()
}
fn default_api_version() -> ChromaApiVersion {
    ChromaApiVersion::V2
}
fn default_tenant() -> String {
    "default_tenant".into()
}
fn default_database() -> String {
    "default_database".into()
}
fn default_collection() -> String {
    "company_docs".into()
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: default_index_url(),
            api_version: default_api_version(),
            tenant: default_tenant(),
            database: default_database(),
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Documents retrieved per query.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Hard cap on the assembled context, in characters.
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Per-call timeout for embedding, search, and completion.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_top_k() -> usize {
    3
}
fn default_max_context_chars() -> usize {
    12_000
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_context_chars: default_max_context_chars(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.ragguard/config.toml).
    ///
    /// Environment variables override file values:
    /// - `RAGGUARD_TOKEN_SECRET`
    /// - `RAGGUARD_COMPLETION_API_KEY`, then `GROQ_API_KEY`
    /// - `RAGGUARD_EMBEDDING_API_KEY`, then `OPENAI_API_KEY`
    /// - `RAGGUARD_MODEL`
    /// - `RAGGUARD_CHROMA_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path`, then apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, |key| std::env::var(key).ok())
    }

    /// Load from `path`, apply overrides from `lookup`, then validate the
    /// merged result.
    pub fn load_with_overrides(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a specific file path. Not validated; the
    /// file may rely on overrides to become complete.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup("RAGGUARD_TOKEN_SECRET") {
            self.auth.token_secret = Some(secret);
        }

        if let Some(key) = lookup("RAGGUARD_COMPLETION_API_KEY").or_else(|| lookup("GROQ_API_KEY")) {
            self.completion.api_key = Some(key);
        }

        if let Some(key) = lookup("RAGGUARD_EMBEDDING_API_KEY").or_else(|| lookup("OPENAI_API_KEY")) {
            self.embedding.api_key = Some(key);
        }

        if let Some(model) = lookup("RAGGUARD_MODEL") {
            self.completion.model = model;
        }

        if let Some(url) = lookup("RAGGUARD_CHROMA_URL") {
            self.index.url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".ragguard")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.completion.temperature) {
            return Err(ConfigError::ValidationError(
                "completion.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.pipeline.top_k == 0 {
            return Err(ConfigError::ValidationError("pipeline.top_k must be > 0".into()));
        }

        if self.pipeline.max_context_chars == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.max_context_chars must be > 0".into(),
            ));
        }

        if self.pipeline.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.timeout_secs must be > 0".into(),
            ));
        }

        if self.auth.token_secret.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::ValidationError(
                "auth.token_secret must not be empty".into(),
            ));
        }

        if self.gateway.login_attempts_per_minute == 0 {
            return Err(ConfigError::ValidationError(
                "gateway.login_attempts_per_minute must be > 0".into(),
            ));
        }

        let mut seen = HashSet::new();
        for user in &self.auth.users {
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate user '{}' in auth.users",
                    user.username
                )));
            }
        }

        Ok(())
    }

    /// The token signing secret, required before serving.
    pub fn token_secret(&self) -> Result<&str, ConfigError> {
        self.auth.token_secret.as_deref().ok_or_else(|| {
            ConfigError::ValidationError(
                "auth.token_secret is not set (config file or RAGGUARD_TOKEN_SECRET)".into(),
            )
        })
    }

    /// Generate a default config TOML string (for `init` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
