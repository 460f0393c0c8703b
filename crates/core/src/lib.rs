//! # ragguard core
//!
//! Domain types, collaborator traits, and error definitions for the
//! authorization-aware retrieval pipeline. This crate has **no framework
//! dependencies**: it defines the model every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each external collaborator (language model, embedding model, vector index,
//! credential store) is a trait here. Implementations live in their own
//! crates, which keeps test doubles trivial to substitute and keeps the
//! dependency graph pointing inward.

pub mod access;
pub mod credentials;
pub mod document;
pub mod error;
pub mod index;
pub mod message;
pub mod provider;
pub mod query;
pub mod role;

// Re-export key types at crate root for ergonomics
pub use access::{AccessFilter, AccessPolicy};
pub use credentials::{CredentialRecord, CredentialStore};
pub use document::{Document, ScoredDocument};
pub use error::{AuthError, Error, ErrorKind, IndexError, ProviderError, Result};
pub use index::VectorIndex;
pub use message::{Message, MessageRole};
pub use provider::{EmbeddingRequest, EmbeddingResponse, Provider, ProviderRequest, ProviderResponse};
pub use query::{Query, QueryResponse};
pub use role::{Role, User};
