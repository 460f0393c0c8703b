//! The service object handed to the pipeline.
//!
//! Every external collaborator is built once at startup and shared behind
//! `Arc`; nothing here is mutated after construction.

use std::sync::Arc;
use std::time::Duration;

use ragguard_config::AppConfig;
use ragguard_core::error::Error;
use ragguard_core::index::VectorIndex;
use ragguard_core::provider::Provider;

use crate::context::DEFAULT_MAX_CONTEXT_CHARS;

/// Tunables for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub top_k: usize,
    pub max_context_chars: usize,
    /// Applied separately to the embed, search and completion calls.
    pub timeout: Duration,
    pub completion_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            timeout: Duration::from_secs(30),
            completion_model: "llama3-8b-8192".into(),
            embedding_model: "text-embedding-3-small".into(),
            temperature: 0.3,
            max_tokens: None,
        }
    }
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            top_k: config.pipeline.top_k,
            max_context_chars: config.pipeline.max_context_chars,
            timeout: Duration::from_secs(config.pipeline.timeout_secs),
            completion_model: config.completion.model.clone(),
            embedding_model: config.embedding.model.clone(),
            temperature: config.completion.temperature,
            max_tokens: config.completion.max_tokens,
        }
    }
}

/// External collaborators of the pipeline.
#[derive(Clone)]
pub struct Services {
    pub embedder: Arc<dyn Provider>,
    pub completion: Arc<dyn Provider>,
    pub index: Arc<dyn VectorIndex>,
    pub settings: PipelineSettings,
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("embedder", &self.embedder.name())
            .field("completion", &self.completion.name())
            .field("index", &self.index.name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Services {
    pub fn new(
        embedder: Arc<dyn Provider>,
        completion: Arc<dyn Provider>,
        index: Arc<dyn VectorIndex>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            embedder,
            completion,
            index,
            settings,
        }
    }

    /// Build providers and the index from configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        let completion = ragguard_providers::build_completion_provider(config)
            .map_err(|e| config_error("completion", e))?;
        let embedder = ragguard_providers::build_embedding_provider(config)
            .map_err(|e| config_error("embedding", e))?;
        let index =
            ragguard_index::build_index(config).map_err(|e| config_error("index", e))?;

        Ok(Self::new(
            embedder,
            completion,
            index,
            PipelineSettings::from_config(config),
        ))
    }
}

fn config_error(section: &str, e: impl std::fmt::Display) -> Error {
    Error::Config {
        message: format!("{section}: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_config() {
        let mut config = AppConfig::default();
        config.pipeline.top_k = 5;
        config.pipeline.timeout_secs = 7;
        config.completion.model = "llama-3.1-8b-instant".into();

        let settings = PipelineSettings::from_config(&config);
        assert_eq!(settings.top_k, 5);
        assert_eq!(settings.timeout, Duration::from_secs(7));
        assert_eq!(settings.completion_model, "llama-3.1-8b-instant");
        assert_eq!(settings.max_context_chars, 12_000);
    }

    #[test]
    fn from_config_needs_api_keys() {
        let config = AppConfig::default();
        let err = Services::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn from_config_builds_everything() {
        let mut config = AppConfig::default();
        config.completion.api_key = Some("gsk-test".into());
        config.embedding.api_key = Some("sk-test".into());

        let services = Services::from_config(&config).unwrap();
        assert_eq!(services.completion.name(), "groq");
        assert_eq!(services.embedder.name(), "openai");
        assert_eq!(services.index.name(), "chroma");
    }
}
