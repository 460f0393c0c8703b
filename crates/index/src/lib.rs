//! # ragguard index
//!
//! Implementations of [`ragguard_core::VectorIndex`]:
//!
//! - [`ChromaIndex`]: HTTP client for a Chroma server, filtering server-side
//!   with a `where` clause
//! - [`InMemoryIndex`]: embeddings held in process, for tests and embedding
//!   callers that load their own documents
//!
//! Both apply the access filter before ranking. Only Chroma is built from
//! configuration; an empty in-memory index would answer nothing.

pub mod chroma;
pub mod in_memory;
pub mod vector;

pub use chroma::{ChromaApi, ChromaIndex};
pub use in_memory::InMemoryIndex;
pub use vector::cosine_similarity;

use std::sync::Arc;
use std::time::Duration;

use ragguard_config::{AppConfig, ChromaApiVersion};
use ragguard_core::VectorIndex;
use ragguard_core::error::IndexError;

/// Build the Chroma client described by `[index]`.
pub fn build_index(config: &AppConfig) -> Result<Arc<dyn VectorIndex>, IndexError> {
    let c = &config.index;
    let api = match c.api_version {
        ChromaApiVersion::V1 => ChromaApi::V1,
        ChromaApiVersion::V2 => ChromaApi::V2 {
            tenant: c.tenant.clone(),
            database: c.database.clone(),
        },
    };
    let index = ChromaIndex::new(
        &c.url,
        &api,
        &c.collection,
        Duration::from_secs(config.pipeline.timeout_secs),
    )?;
    tracing::info!(url = %c.url, api = ?c.api_version, collection = %c.collection, "Vector index configured");
    Ok(Arc::new(index))
}
