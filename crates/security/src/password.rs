//! Argon2id password hashing.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use ragguard_core::error::AuthError;

/// Hashes and verifies passwords in PHC string format.
///
/// Holds a precomputed hash of a throwaway password so that a lookup miss
/// can still run one full verification.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    dummy_hash: String,
}

impl PasswordHasher {
    /// Argon2id with the library's default cost parameters.
    pub fn new() -> Result<Self, AuthError> {
        Self::with_argon2(Argon2::default())
    }

    /// Argon2id with explicit cost parameters (memory in KiB, iterations,
    /// parallelism). Tests use the minimum to stay fast.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Internal(format!("argon2 params: {e}")))?;
        Self::with_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn with_argon2(argon2: Argon2<'static>) -> Result<Self, AuthError> {
        let dummy_hash = hash_with(&argon2, "ragguard-dummy-password")?;
        Ok(Self { argon2, dummy_hash })
    }

    /// Hash `password` with a fresh random salt.
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, password)
    }

    /// Constant-time check of `password` against a stored PHC string.
    ///
    /// A stored hash that does not parse is an internal error, not a
    /// credential mismatch.
    pub fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AuthError::Internal(format!("stored hash: {e}")))?;
        Ok(self
            .argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Spend one verification on the dummy hash, discarding the result.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}

/// Whether `hash` is a PHC string we can verify against.
pub fn is_valid_hash(hash: &str) -> bool {
    PasswordHash::new(hash).is_ok()
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Internal(format!("argon2: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn hash_then_verify() {
        let hasher = cheap();
        let hash = hasher.hash("finance_pass").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("finance_pass", &hash).unwrap());
        assert!(!hasher.verify("wrong", &hash).unwrap());
    }

    #[test]
    fn salts_differ() {
        let hasher = cheap();
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn malformed_hash_is_internal_error() {
        let err = cheap().verify("pw", "not-a-phc-string").unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert!(!is_valid_hash("not-a-phc-string"));
    }

    #[test]
    fn dummy_hash_is_well_formed() {
        let hasher = cheap();
        assert!(is_valid_hash(&hasher.dummy_hash));
        hasher.verify_dummy("anything");
    }

    #[test]
    fn verifies_hash_made_with_other_params() {
        let strong = PasswordHasher::with_params(16, 2, 1).unwrap();
        let hash = strong.hash("hr_pass").unwrap();
        assert!(cheap().verify("hr_pass", &hash).unwrap());
    }
}
