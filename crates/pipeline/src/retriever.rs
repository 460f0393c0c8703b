//! Retriever: role-filtered nearest-neighbour search.

use std::sync::Arc;
use std::time::Duration;

use ragguard_core::access::AccessFilter;
use ragguard_core::document::ScoredDocument;
use ragguard_core::error::Error;
use ragguard_core::index::VectorIndex;
use tracing::{debug, error};

pub struct Retriever {
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl Retriever {
    pub fn new(index: Arc<dyn VectorIndex>, timeout: Duration) -> Self {
        Self { index, timeout }
    }

    /// Up to `top_k` documents permitted by `filter`, most similar first.
    ///
    /// The filter is handed to the index so it is applied before ranking.
    /// Results are re-checked here as well; anything the index returns in
    /// violation of the filter is dropped. An empty result is not an error.
    pub async fn search(
        &self,
        embedding: &[f32],
        filter: &AccessFilter,
        top_k: usize,
    ) -> Result<Vec<ScoredDocument>, Error> {
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let results = tokio::time::timeout(self.timeout, self.index.query(embedding, filter, top_k))
            .await
            .map_err(|_| {
                Error::RetrievalUnavailable(format!(
                    "{} search timed out after {:?}",
                    self.index.name(),
                    self.timeout
                ))
            })?
            .map_err(|e| Error::RetrievalUnavailable(e.to_string()))?;

        let returned = results.len();
        let mut permitted: Vec<ScoredDocument> = results
            .into_iter()
            .filter(|hit| {
                let ok = filter.permits(&hit.document);
                if !ok {
                    error!(
                        index = self.index.name(),
                        document = %hit.document.id,
                        %filter,
                        "Index returned a document outside the access filter; dropping it"
                    );
                }
                ok
            })
            .collect();
        permitted.truncate(top_k);

        debug!(returned, kept = permitted.len(), %filter, "Retrieval complete");
        Ok(permitted)
    }
}
