//! Chroma HTTP client.
//!
//! Filtering happens server-side: the access filter is sent as Chroma's
//! `where` clause, so `n_results` counts only permitted documents.

use std::time::Duration;

use async_trait::async_trait;
use ragguard_core::access::AccessFilter;
use ragguard_core::document::{Document, ScoredDocument};
use ragguard_core::error::IndexError;
use ragguard_core::index::VectorIndex;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Which HTTP API, and for v2 which tenant and database, to address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromaApi {
    V1,
    V2 { tenant: String, database: String },
}

impl Default for ChromaApi {
    fn default() -> Self {
        Self::V2 {
            tenant: "default_tenant".into(),
            database: "default_database".into(),
        }
    }
}

impl ChromaApi {
    /// The URL under which this server lists collections.
    fn collections_url(&self, base_url: &str) -> String {
        match self {
            Self::V1 => format!("{base_url}/api/v1/collections"),
            Self::V2 { tenant, database } => {
                format!("{base_url}/api/v2/tenants/{tenant}/databases/{database}/collections")
            }
        }
    }
}

/// A collection on a Chroma server.
pub struct ChromaIndex {
    collections_url: String,
    collection: String,
    collection_id: OnceCell<String>,
    client: reqwest::Client,
}

impl ChromaIndex {
    pub fn new(
        base_url: &str,
        api: &ChromaApi,
        collection: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IndexError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IndexError::Request(format!("HTTP client: {e}")))?;

        Ok(Self {
            collections_url: api.collections_url(base_url.trim_end_matches('/')),
            collection: collection.into(),
            collection_id: OnceCell::new(),
            client,
        })
    }

    /// Resolve the collection id once and cache it.
    async fn collection_id(&self) -> Result<&str, IndexError> {
        let id = self
            .collection_id
            .get_or_try_init(|| async {
                let url = format!("{}/{}", self.collections_url, self.collection);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| IndexError::Request(e.to_string()))?;

                let status = response.status().as_u16();
                if status == 404 {
                    return Err(IndexError::CollectionNotFound(self.collection.clone()));
                }
                if status != 200 {
                    let body = response.text().await.unwrap_or_default();
                    // Older Chroma servers report a missing collection as a 500
                    if body.contains("does not exist") {
                        return Err(IndexError::CollectionNotFound(self.collection.clone()));
                    }
                    return Err(IndexError::Status {
                        status_code: status,
                        message: body,
                    });
                }

                let info: CollectionInfo = response
                    .json()
                    .await
                    .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;
                debug!(collection = %self.collection, id = %info.id, "Resolved Chroma collection");
                Ok::<_, IndexError>(info.id)
            })
            .await?;
        Ok(id.as_str())
    }
}

/// Build the body of a Chroma `query` call.
fn query_body(embedding: &[f32], filter: &AccessFilter, top_k: usize) -> serde_json::Value {
    let mut body = serde_json::json!({
        "query_embeddings": [embedding],
        "n_results": top_k,
        "include": ["documents", "metadatas", "distances"],
    });
    if let Some(clause) = filter.to_where_clause() {
        body["where"] = clause;
    }
    body
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    fn name(&self) -> &str {
        "chroma"
    }

    async fn query(
        &self,
        embedding: &[f32],
        filter: &AccessFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, IndexError> {
        let id = self.collection_id().await?;
        let url = format!("{}/{}/query", self.collections_url, id);

        debug!(collection = %self.collection, %filter, top_k, "Querying Chroma");

        let response = self
            .client
            .post(&url)
            .json(&query_body(embedding, filter, top_k))
            .send()
            .await
            .map_err(|e| IndexError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Chroma query failed");
            return Err(IndexError::Status {
                status_code: status,
                message: body,
            });
        }

        let parsed: QueryResult = response
            .json()
            .await
            .map_err(|e| IndexError::MalformedResponse(e.to_string()))?;

        Ok(parsed.into_scored())
    }
}

// --- Chroma wire types ---

#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
}

/// Chroma returns one inner list per query embedding; we always send one.
#[derive(Debug, Deserialize)]
struct QueryResult {
    ids: Vec<Vec<String>>,
    #[serde(default)]
    documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<serde_json::Map<String, serde_json::Value>>>>>,
    #[serde(default)]
    distances: Option<Vec<Vec<f32>>>,
}

impl QueryResult {
    fn into_scored(self) -> Vec<ScoredDocument> {
        let ids = self.ids.into_iter().next().unwrap_or_default();
        let mut documents = first(self.documents).into_iter();
        let mut metadatas = first(self.metadatas).into_iter();
        let mut distances = first(self.distances).into_iter();

        ids.into_iter()
            .map(|id| {
                let text = documents.next().flatten().unwrap_or_default();
                let metadata = metadatas.next().flatten().unwrap_or_default();
                let distance = distances.next().unwrap_or(1.0);
                ScoredDocument {
                    document: Document { id, text, metadata },
                    score: 1.0 - distance,
                }
            })
            .collect()
    }
}

fn first<T>(nested: Option<Vec<Vec<T>>>) -> Vec<T> {
    nested
        .and_then(|outer| outer.into_iter().next())
        .unwrap_or_default()
}
