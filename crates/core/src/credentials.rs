//! Credential store abstraction.

use crate::role::User;

/// What the store holds for one account. Only the auth gate reads
/// `password_hash`.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    pub user: User,
    /// Salted password hash in PHC string format.
    pub password_hash: String,
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("user", &self.user)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Read-only account lookup, loaded once at startup.
pub trait CredentialStore: Send + Sync {
    fn lookup(&self, username: &str) -> Option<CredentialRecord>;
}
