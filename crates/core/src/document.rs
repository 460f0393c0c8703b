//! Documents as seen through the vector index.
//!
//! Documents are owned by the external index; this crate only reads them.

use serde::{Deserialize, Serialize};

/// Metadata key naming the originating file.
pub const SOURCE_KEY: &str = "source";

/// Label reported for documents whose metadata has no `source`.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// A document returned by the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Index-assigned identifier.
    pub id: String,

    /// The document text.
    pub text: String,

    /// Arbitrary metadata (`source`, `department` or `access_level`, ...).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Builder-style metadata setter.
    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.to_string(), serde_json::Value::String(value.into()));
        self
    }

    /// A string-valued metadata field.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// The `source` label, or `"unknown"` when absent.
    pub fn source(&self) -> &str {
        self.metadata_str(SOURCE_KEY).unwrap_or(UNKNOWN_SOURCE)
    }
}

/// A document paired with its similarity to the query (higher is closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: Document,
    pub score: f32,
}
