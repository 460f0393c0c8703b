//! LLM and embedding provider implementations for ragguard.
//!
//! All providers implement the `ragguard_core::Provider` trait.
//! The factory builds the completion and embedding providers from configuration.

pub mod factory;
pub mod openai_compat;

pub use factory::{build_completion_provider, build_embedding_provider, default_base_url};
pub use openai_compat::OpenAiCompatProvider;
