//! Shared test doubles for pipeline tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ragguard_core::access::AccessFilter;
use ragguard_core::document::{Document, ScoredDocument};
use ragguard_core::error::{IndexError, ProviderError};
use ragguard_core::index::VectorIndex;
use ragguard_core::message::Message;
use ragguard_core::provider::*;
use ragguard_index::InMemoryIndex;

use crate::services::{PipelineSettings, Services};

/// A completion provider that always answers with the same text and keeps
/// every request it saw.
pub struct ScriptedProvider {
    answer: String,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(answer: &str) -> Self {
        Self {
            answer: answer.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);
        Ok(ProviderResponse {
            message: Message::assistant(&self.answer),
            usage: None,
            model,
        })
    }
}

/// What a [`FaultyProvider`] does on every call.
#[derive(Clone, Copy)]
pub enum Fault {
    /// Connection refused.
    Unreachable,
    /// Sleeps for an hour.
    Hang,
    Panic,
}

pub struct FaultyProvider(pub Fault);

impl FaultyProvider {
    async fn fail<T: Send>(&self) -> Result<T, ProviderError> {
        match self.0 {
            Fault::Unreachable => Err(ProviderError::Network("connection refused".into())),
            Fault::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(ProviderError::Timeout("slept".into()))
            }
            Fault::Panic => panic!("provider blew up"),
        }
    }
}

#[async_trait]
impl Provider for FaultyProvider {
    fn name(&self) -> &str {
        "faulty"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.fail().await
    }

    async fn embed(&self, _request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        self.fail().await
    }
}

/// Counts occurrences of a fixed vocabulary, one dimension per word.
pub struct KeywordEmbedder;

pub const VOCABULARY: [&str; 5] = ["revenue", "salary", "campaign", "deploy", "holiday"];

pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    VOCABULARY
        .iter()
        .map(|word| lower.matches(word).count() as f32)
        .collect()
}

#[async_trait]
impl Provider for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(ProviderError::NotConfigured("keyword embedder cannot complete".into()))
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, ProviderError> {
        Ok(EmbeddingResponse {
            embeddings: request.inputs.iter().map(|t| keyword_vector(t)).collect(),
            model: request.model,
        })
    }
}

/// An index that ignores the filter and returns everything it holds.
pub struct LeakyIndex(pub Vec<Document>);

#[async_trait]
impl VectorIndex for LeakyIndex {
    fn name(&self) -> &str {
        "leaky"
    }

    async fn query(
        &self,
        _embedding: &[f32],
        _filter: &AccessFilter,
        _top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        Ok(self
            .0
            .iter()
            .map(|d| ScoredDocument {
                document: d.clone(),
                score: 1.0,
            })
            .collect())
    }
}

/// An index whose server is down.
pub struct DownIndex;

#[async_trait]
impl VectorIndex for DownIndex {
    fn name(&self) -> &str {
        "down"
    }

    async fn query(
        &self,
        _embedding: &[f32],
        _filter: &AccessFilter,
        _top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        Err(IndexError::Request("connection refused".into()))
    }
}

/// An index that never answers.
pub struct HangingIndex;

#[async_trait]
impl VectorIndex for HangingIndex {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn query(
        &self,
        _embedding: &[f32],
        _filter: &AccessFilter,
        _top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

pub fn doc(id: &str, text: &str, field: &str, value: &str, source: &str) -> Document {
    Document::new(id, text)
        .with_metadata(field, value)
        .with_metadata("source", source)
}

/// A small company corpus, embedded with [`keyword_vector`].
pub async fn company_index() -> InMemoryIndex {
    let index = InMemoryIndex::new();
    let corpus = [
        doc("fin-1", "Q1 revenue was $10M, up 12% year over year.", "department", "finance", "q1_report.md"),
        doc("fin-2", "Q2 revenue forecast is $11M.", "department", "finance", "q2_forecast.md"),
        doc("hr-1", "Salary bands were revised in March.", "department", "hr", "salary_bands.md"),
        doc("mkt-1", "The spring campaign reached 2M users.", "department", "marketing", "campaign.md"),
        doc("eng-1", "We deploy to production every Tuesday.", "department", "engineering", "deploy.md"),
        doc("gen-1", "The office is closed on the holiday.", "access_level", "general", "handbook.md"),
    ];
    for d in corpus {
        let embedding = keyword_vector(&d.text);
        index.insert(d, embedding).await;
    }
    index
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        timeout: Duration::from_secs(5),
        ..PipelineSettings::default()
    }
}

pub fn services(
    embedder: Arc<dyn Provider>,
    completion: Arc<dyn Provider>,
    index: Arc<dyn VectorIndex>,
) -> Services {
    Services::new(embedder, completion, index, settings())
}
