//! Pipeline: the orchestrator behind `/query`.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use ragguard_core::access::AccessPolicy;
use ragguard_core::error::Error;
use ragguard_core::provider::EmbeddingRequest;
use ragguard_core::query::{Query, QueryResponse};
use ragguard_core::role::User;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::context::assemble;
use crate::retriever::Retriever;
use crate::services::Services;
use crate::synthesizer::{AnswerSynthesizer, DEGRADED_ANSWER};

/// Returned when the caller's role can see nothing relevant.
pub const NO_ACCESSIBLE_ANSWER: &str = "No accessible information found.";

/// How a run ended when nothing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Documents were retrieved and an answer produced (possibly the
    /// degraded one, if only synthesis failed).
    Answered { answer: String, sources: Vec<String> },
    /// Retrieval succeeded but matched nothing the role may see.
    NoAccessibleDocuments,
}

pub struct Pipeline {
    services: Services,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl Pipeline {
    pub fn new(services: Services) -> Self {
        let retriever = Retriever::new(services.index.clone(), services.settings.timeout);
        let synthesizer =
            AnswerSynthesizer::new(services.completion.clone(), services.settings.clone());
        Self {
            services,
            retriever,
            synthesizer,
        }
    }

    /// Answer `query` for `user`. Never fails.
    ///
    /// Retrieval failures and panics give [`DEGRADED_ANSWER`] with no
    /// sources; a synthesis failure gives [`DEGRADED_ANSWER`] with the
    /// sources that were retrieved.
    pub async fn answer(&self, query: &Query, user: &User) -> QueryResponse {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "query",
            %request_id,
            user = %user.username,
            role = %user.role
        );

        async {
            let run = AssertUnwindSafe(self.run(query, user)).catch_unwind().await;

            let (answer, sources) = match run {
                Ok(Ok(Outcome::Answered { answer, sources })) => {
                    info!(sources = ?sources, "Query answered");
                    (answer, sources)
                }
                Ok(Ok(Outcome::NoAccessibleDocuments)) => {
                    info!("No accessible documents");
                    (NO_ACCESSIBLE_ANSWER.to_string(), Vec::new())
                }
                Ok(Err(e)) => {
                    warn!(kind = %e.kind(), error = %e, "Retrieval failed");
                    (DEGRADED_ANSWER.to_string(), Vec::new())
                }
                Err(panic) => {
                    error!(panic = panic_message(&*panic), "Pipeline panicked");
                    (DEGRADED_ANSWER.to_string(), Vec::new())
                }
            };

            QueryResponse {
                answer,
                sources,
                role: user.role.to_string(),
            }
        }
        .instrument(span)
        .await
    }

    /// The pipeline steps with failures left explicit.
    pub async fn run(&self, query: &Query, user: &User) -> Result<Outcome, Error> {
        let settings = &self.services.settings;

        let filter = AccessPolicy::resolve(user.role);
        let embedding = self.embed(&query.text).await?;

        let docs = self
            .retriever
            .search(&embedding, &filter, settings.top_k)
            .await?;
        if docs.is_empty() {
            return Ok(Outcome::NoAccessibleDocuments);
        }

        let texts: Vec<&str> = docs.iter().map(|d| d.document.text.as_str()).collect();
        let context = assemble(&texts, settings.max_context_chars);

        let answer = self
            .synthesizer
            .synthesize(&query.text, &context, user.role, user.department.as_deref())
            .await;

        let sources = docs
            .iter()
            .map(|d| d.document.source().to_string())
            .collect();

        Ok(Outcome::Answered { answer, sources })
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, Error> {
        let settings = &self.services.settings;
        let request = EmbeddingRequest {
            model: settings.embedding_model.clone(),
            inputs: vec![text.to_string()],
        };

        let response = tokio::time::timeout(settings.timeout, self.services.embedder.embed(request))
            .await
            .map_err(|_| {
                Error::RetrievalUnavailable(format!(
                    "embedding timed out after {:?}",
                    settings.timeout
                ))
            })?
            .map_err(|e| Error::RetrievalUnavailable(format!("embedding: {e}")))?;

        response
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::RetrievalUnavailable("embedding response was empty".into()))
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
