//! In-memory credential store, built once at startup.

use std::collections::HashMap;

use ragguard_config::AuthConfig;
use ragguard_core::credentials::{CredentialRecord, CredentialStore};
use ragguard_core::error::AuthError;
use ragguard_core::role::{Role, User};
use thiserror::Error;
use tracing::info;

use crate::password::{PasswordHasher, is_valid_hash};

/// The built-in demo accounts: `(username, password, role, department)`.
pub const DEMO_USERS: [(&str, &str, Role, Option<&str>); 6] = [
    ("finance_user", "finance_pass", Role::Finance, Some("Finance")),
    ("marketing_user", "marketing_pass", Role::Marketing, Some("Marketing")),
    ("hr_user", "hr_pass", Role::Hr, Some("HR")),
    ("eng_user", "eng_pass", Role::Engineering, Some("Engineering")),
    ("ceo_user", "ceo_pass", Role::Ceo, None),
    ("employee_user", "employee_pass", Role::Employee, None),
];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate username '{0}'")]
    DuplicateUser(String),

    #[error("password hash for '{0}' is not a valid PHC string")]
    MalformedHash(String),

    #[error(transparent)]
    Hashing(#[from] AuthError),
}

/// Read-only username → record map.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    records: HashMap<String, CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new(records: impl IntoIterator<Item = CredentialRecord>) -> Result<Self, StoreError> {
        let mut map = HashMap::new();
        for record in records {
            if !is_valid_hash(&record.password_hash) {
                return Err(StoreError::MalformedHash(record.user.username));
            }
            let username = record.user.username.clone();
            if map.insert(username.clone(), record).is_some() {
                return Err(StoreError::DuplicateUser(username));
            }
        }
        Ok(Self { records: map })
    }

    /// The six demo accounts, hashed with `hasher`.
    pub fn demo(hasher: &PasswordHasher) -> Result<Self, StoreError> {
        Self::new(demo_records(hasher)?)
    }

    /// Accounts from `[auth]`: configured users, plus the demo accounts when
    /// `demo_users` is set.
    pub fn from_config(config: &AuthConfig, hasher: &PasswordHasher) -> Result<Self, StoreError> {
        let mut records = if config.demo_users {
            demo_records(hasher)?
        } else {
            Vec::new()
        };

        records.extend(config.users.iter().map(|u| CredentialRecord {
            user: User::new(&u.username, u.role, u.department.as_deref()),
            password_hash: u.password_hash.clone(),
        }));

        let store = Self::new(records)?;
        info!(
            users = store.len(),
            demo = config.demo_users,
            "Credential store loaded"
        );
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn demo_records(hasher: &PasswordHasher) -> Result<Vec<CredentialRecord>, StoreError> {
    DEMO_USERS
        .iter()
        .map(|(username, password, role, department)| -> Result<_, StoreError> {
            Ok(CredentialRecord {
                user: User::new(*username, *role, *department),
                password_hash: hasher.hash(password)?,
            })
        })
        .collect()
}

impl CredentialStore for InMemoryCredentialStore {
    fn lookup(&self, username: &str) -> Option<CredentialRecord> {
        self.records.get(username).cloned()
    }
}
