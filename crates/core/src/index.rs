//! VectorIndex trait: the abstraction over nearest-neighbour stores.

use async_trait::async_trait;

use crate::access::AccessFilter;
use crate::document::ScoredDocument;
use crate::error::IndexError;

/// A similarity-search backend.
///
/// Implementations MUST apply `filter` before ranking, so the `top_k` slots
/// are spent only on documents the caller may see. Results are ordered by
/// decreasing score. An empty result is not an error.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// A human-readable name for this index (e.g., "chroma", "in_memory").
    fn name(&self) -> &str;

    /// Return at most `top_k` documents satisfying `filter`, nearest first.
    async fn query(
        &self,
        embedding: &[f32],
        filter: &AccessFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError>;
}
