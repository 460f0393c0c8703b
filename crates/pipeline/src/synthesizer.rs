//! AnswerSynthesizer: grounded, role-scoped prompting of the completion model.

use std::sync::Arc;

use ragguard_core::error::Error;
use ragguard_core::message::Message;
use ragguard_core::provider::{Provider, ProviderRequest};
use ragguard_core::role::Role;
use tracing::{debug, warn};

use crate::services::PipelineSettings;

/// Returned in place of an answer when synthesis (or the pipeline) fails.
pub const DEGRADED_ANSWER: &str = "An internal error occurred while processing your query.";

/// The user message sent to the model.
pub fn build_prompt(query: &str, context: &str, department: Option<&str>) -> String {
    let audience = department.unwrap_or("the company");
    format!(
        "You are a helpful assistant for {audience}.\n\n\
         Context:\n{context}\n\n\
         Question:\n{query}\n\n\
         Guidelines:\n\
         1. Answer concisely and professionally.\n\
         2. Use only the provided context.\n\
         3. If unsure, say \"I don't have enough information to answer that.\"\n\
         4. For financial data, include relevant numbers when available.\n\
         5. For HR questions, be particularly careful with sensitive information."
    )
}

/// The role-scoped system instruction.
pub fn system_instruction(role: Role) -> String {
    format!("You are a {role} department assistant.")
}

pub struct AnswerSynthesizer {
    provider: Arc<dyn Provider>,
    settings: PipelineSettings,
}

impl AnswerSynthesizer {
    pub fn new(provider: Arc<dyn Provider>, settings: PipelineSettings) -> Self {
        Self { provider, settings }
    }

    /// One completion call. Network errors, timeouts and blank completions
    /// are all `SynthesisUnavailable`.
    pub async fn try_synthesize(
        &self,
        query: &str,
        context: &str,
        role: Role,
        department: Option<&str>,
    ) -> Result<String, Error> {
        let request = ProviderRequest {
            model: self.settings.completion_model.clone(),
            messages: vec![
                Message::system(system_instruction(role)),
                Message::user(build_prompt(query, context, department)),
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!(
            provider = self.provider.name(),
            model = %request.model,
            context_chars = context.chars().count(),
            "Requesting completion"
        );

        let response = tokio::time::timeout(self.settings.timeout, self.provider.complete(request))
            .await
            .map_err(|_| {
                Error::SynthesisUnavailable(format!(
                    "completion timed out after {:?}",
                    self.settings.timeout
                ))
            })?
            .map_err(|e| Error::SynthesisUnavailable(e.to_string()))?;

        let answer = response.message.content;
        if answer.trim().is_empty() {
            return Err(Error::SynthesisUnavailable("empty completion".into()));
        }
        Ok(answer)
    }

    /// Like [`try_synthesize`](Self::try_synthesize), but any failure yields
    /// [`DEGRADED_ANSWER`].
    pub async fn synthesize(
        &self,
        query: &str,
        context: &str,
        role: Role,
        department: Option<&str>,
    ) -> String {
        match self.try_synthesize(query, context, role, department).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(kind = %e.kind(), error = %e, "Synthesis failed, returning degraded answer");
                DEGRADED_ANSWER.to_string()
            }
        }
    }
}
