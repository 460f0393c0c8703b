//! Request and response shapes of a single question.

use serde::{Deserialize, Serialize};

/// A natural-language question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// The answer returned for a [`Query`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: String,
    /// `source` of each retrieved document, in retrieval order.
    pub sources: Vec<String>,
    /// The asking user's role name.
    pub role: String,
}
