//! Identity and security for ragguard.
//!
//! Provides:
//! - **AuthGate**: password authentication and signed, expiring identity tokens
//! - **Passwords**: Argon2id hashing in PHC format
//! - **Tokens**: HS256 compact tokens
//! - **Credential store**: read-only in-memory accounts, including the demo set
//! - **Audit logging**: structured security event logging

pub mod audit;
pub mod credentials;
pub mod gate;
pub mod password;
pub mod token;

pub use audit::{AuditEntry, AuditEvent, AuditLogger, AuditOutcome, AuditSink, TracingSink};
pub use credentials::{DEMO_USERS, InMemoryCredentialStore, StoreError};
pub use gate::{AccessToken, AuthGate};
pub use password::PasswordHasher;
pub use token::{TOKEN_TTL, TokenClaims, TokenSigner};
