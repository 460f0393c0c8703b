//! In-memory index: useful for testing and dry runs.

use async_trait::async_trait;
use ragguard_core::access::AccessFilter;
use ragguard_core::document::{Document, ScoredDocument};
use ragguard_core::error::IndexError;
use ragguard_core::index::VectorIndex;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::vector::cosine_similarity;

/// An index that keeps `(Document, embedding)` pairs in a Vec and ranks by
/// cosine similarity.
#[derive(Clone)]
pub struct InMemoryIndex {
    entries: Arc<RwLock<Vec<(Document, Vec<f32>)>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a document with its precomputed embedding.
    pub async fn insert(&self, document: Document, embedding: Vec<f32>) {
        self.entries.write().await.push((document, embedding));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn query(
        &self,
        embedding: &[f32],
        filter: &AccessFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        let entries = self.entries.read().await;

        let mut results: Vec<ScoredDocument> = entries
            .iter()
            .filter(|(doc, _)| filter.permits(doc))
            .map(|(doc, emb)| ScoredDocument {
                document: doc.clone(),
                score: cosine_similarity(emb, embedding),
            })
            .collect();

        // sort_by is stable: equal scores keep insertion order
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }
}
