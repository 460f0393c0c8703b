//! AuthGate: authenticates users and issues/validates identity tokens.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ragguard_core::credentials::CredentialStore;
use ragguard_core::error::AuthError;
use ragguard_core::role::User;
use tracing::debug;

use crate::password::PasswordHasher;
use crate::token::{TOKEN_TTL, TokenClaims, TokenSigner};

/// An issued token. Only `token` goes to the client.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub claims: TokenClaims,
}

pub struct AuthGate {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    signer: TokenSigner,
}

impl AuthGate {
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher, signer: TokenSigner) -> Self {
        Self {
            store,
            hasher,
            signer,
        }
    }

    /// Check a username/password pair.
    ///
    /// An unknown user and a wrong password are indistinguishable: both
    /// return `InvalidCredentials` after one Argon2 verification.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let Some(record) = self.store.lookup(username) else {
            self.hasher.verify_dummy(password);
            debug!(username, "Login for unknown user");
            return Err(AuthError::InvalidCredentials);
        };

        if self.hasher.verify(password, &record.password_hash)? {
            Ok(record.user)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    pub fn issue_token(&self, user: &User) -> Result<AccessToken, AuthError> {
        self.issue_token_at(user, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_token_at(&self, user: &User, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let claims = TokenClaims {
            sub: user.username.clone(),
            role: user.role,
            exp: now.timestamp() + TOKEN_TTL.as_secs() as i64,
        };
        let token = self.signer.sign(&claims)?;
        Ok(AccessToken { token, claims })
    }

    pub fn validate_token(&self, token: &str) -> Result<User, AuthError> {
        self.validate_token_at(token, Utc::now())
    }

    /// Validate as if the current time were `now`.
    ///
    /// The returned user is re-read from the store, so role and department
    /// reflect the store, not the claims.
    pub fn validate_token_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, AuthError> {
        let claims = self.signer.verify(token, now.timestamp())?;
        self.store
            .lookup(&claims.sub)
            .map(|record| record.user)
            .ok_or(AuthError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::InMemoryCredentialStore;
    use chrono::TimeDelta;
    use ragguard_core::credentials::CredentialRecord;
    use ragguard_core::role::Role;

    fn gate_with(store: InMemoryCredentialStore, secret: &str) -> AuthGate {
        AuthGate::new(
            Arc::new(store),
            PasswordHasher::with_params(8, 1, 1).unwrap(),
            TokenSigner::new(secret).unwrap(),
        )
    }

    fn demo_gate() -> AuthGate {
        let hasher = PasswordHasher::with_params(8, 1, 1).unwrap();
        gate_with(InMemoryCredentialStore::demo(&hasher).unwrap(), "gate-secret")
    }

    #[test]
    fn authenticate_demo_user() {
        let gate = demo_gate();
        let user = gate.authenticate("finance_user", "finance_pass").unwrap();
        assert_eq!(user.role, Role::Finance);
        assert_eq!(user.department.as_deref(), Some("Finance"));
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let gate = demo_gate();
        let wrong = gate.authenticate("finance_user", "nope").unwrap_err();
        let unknown = gate.authenticate("ghost", "finance_pass").unwrap_err();
        assert_eq!(wrong, AuthError::InvalidCredentials);
        assert_eq!(wrong, unknown);
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn issued_token_validates_to_same_user() {
        let gate = demo_gate();
        let user = gate.authenticate("hr_user", "hr_pass").unwrap();
        let issued = gate.issue_token(&user).unwrap();
        assert_eq!(gate.validate_token(&issued.token).unwrap(), user);
    }

    #[test]
    fn token_lifetime_is_two_hours() {
        let gate = demo_gate();
        let user = gate.authenticate("eng_user", "eng_pass").unwrap();
        let t0 = Utc::now();
        let issued = gate.issue_token_at(&user, t0).unwrap();
        assert_eq!(issued.claims.exp - t0.timestamp(), 7200);

        assert!(gate.validate_token_at(&issued.token, t0 + TimeDelta::seconds(7200)).is_ok());
        assert_eq!(
            gate.validate_token_at(&issued.token, t0 + TimeDelta::seconds(7201))
                .unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn token_from_other_secret_invalid() {
        let hasher = PasswordHasher::with_params(8, 1, 1).unwrap();
        let a = gate_with(InMemoryCredentialStore::demo(&hasher).unwrap(), "secret-a");
        let b = gate_with(InMemoryCredentialStore::demo(&hasher).unwrap(), "secret-b");
        let user = a.authenticate("ceo_user", "ceo_pass").unwrap();
        let token = a.issue_token(&user).unwrap().token;
        assert_eq!(b.validate_token(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn unknown_subject_invalid() {
        let gate = demo_gate();
        let ghost = User::new("ghost", Role::Ceo, None);
        let token = gate.issue_token(&ghost).unwrap().token;
        assert_eq!(gate.validate_token(&token).unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn user_reloaded_from_store() {
        let hasher = PasswordHasher::with_params(8, 1, 1).unwrap();
        let store = InMemoryCredentialStore::new([CredentialRecord {
            user: User::new("analyst", Role::Marketing, Some("Marketing")),
            password_hash: hasher.hash("pw").unwrap(),
        }])
        .unwrap();
        let gate = gate_with(store, "s");

        // Claims say finance; the store says marketing.
        let stale = User::new("analyst", Role::Finance, None);
        let token = gate.issue_token(&stale).unwrap().token;
        let user = gate.validate_token(&token).unwrap();
        assert_eq!(user.role, Role::Marketing);
    }
}
