//! The question-answering pipeline for ragguard.
//!
//! A query flows through five stages, each a separate component:
//!
//! 1. **AccessPolicy** resolves the caller's role to a metadata filter
//! 2. The embedding provider turns the question into a vector
//! 3. **Retriever** asks the index for the nearest permitted documents
//! 4. **ContextAssembler** joins and caps the document texts
//! 5. **AnswerSynthesizer** prompts the completion model
//!
//! [`Pipeline::answer`] always returns a well-formed response: collaborator
//! failures and panics become a fixed degraded answer.

pub mod context;
pub mod pipeline;
pub mod retriever;
pub mod services;
pub mod synthesizer;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use context::{DEFAULT_MAX_CONTEXT_CHARS, assemble};
pub use pipeline::{NO_ACCESSIBLE_ANSWER, Outcome, Pipeline};
pub use retriever::Retriever;
pub use services::{PipelineSettings, Services};
pub use synthesizer::{AnswerSynthesizer, DEGRADED_ANSWER};
