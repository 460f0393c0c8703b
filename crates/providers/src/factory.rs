//! Provider factory: builds the completion and embedding providers from config.
//!
//! Both are built once at startup and shared behind `Arc` for the life of
//! the process.

use std::sync::Arc;
use std::time::Duration;

use ragguard_config::AppConfig;
use ragguard_core::error::ProviderError;
use ragguard_core::provider::Provider;
use tracing::info;

use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider that serves chat completions.
pub fn build_completion_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let c = &config.completion;
    build(
        &c.provider,
        c.api_url.as_deref(),
        c.api_key.as_deref(),
        Duration::from_secs(config.pipeline.timeout_secs),
    )
}

/// Build the provider that serves query embeddings.
pub fn build_embedding_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let e = &config.embedding;
    build(
        &e.provider,
        e.api_url.as_deref(),
        e.api_key.as_deref(),
        Duration::from_secs(config.pipeline.timeout_secs),
    )
}

fn build(
    name: &str,
    api_url: Option<&str>,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let base_url = match api_url {
        Some(url) => url.to_string(),
        None => default_base_url(name).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider '{name}' and no api_url configured"
            ))
        })?,
    };

    let api_key = match (api_key, name) {
        (Some(key), _) => key.to_string(),
        (None, "ollama") => "ollama".to_string(),
        (None, _) => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key configured for provider '{name}'"
            )));
        }
    };

    info!(provider = %name, base_url = %base_url, "Provider configured");
    Ok(Arc::new(OpenAiCompatProvider::new(
        name, base_url, api_key, timeout,
    )?))
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<String> {
    let url = match provider_name {
        "groq" => "https://api.groq.com/openai/v1",
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "ollama" => "http://localhost:11434/v1",
        "together" => "https://api.together.xyz/v1",
        "vllm" => "http://localhost:8000/v1",
        _ => return None,
    };
    Some(url.to_string())
}
