//! Signed identity tokens.
//!
//! HS256 JWTs via `jsonwebtoken`. Expiry is checked here rather than by the
//! library so the clock can be injected; it runs only after the signature
//! has verified.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ragguard_core::error::AuthError;
use ragguard_core::role::Role;
use serde::{Deserialize, Serialize};

/// Lifetime of an issued token.
pub const TOKEN_TTL: std::time::Duration = std::time::Duration::from_secs(2 * 60 * 60);

/// The signed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Username.
    pub sub: String,
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

/// Signs and verifies tokens with one HMAC key.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("key", &"[REDACTED]").finish()
    }
}

impl TokenSigner {
    pub fn new(secret: &str) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Internal("token secret must not be empty".into()));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn sign(&self, claims: &TokenClaims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::Internal(format!("token signing: {e}")))
    }

    /// Check structure, algorithm, signature and expiry, in that order.
    ///
    /// `now` is seconds since the epoch. A token is still valid at exactly
    /// `exp`.
    pub fn verify(&self, token: &str, now: i64) -> Result<TokenClaims, AuthError> {
        let claims = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })?
            .claims;

        if now > claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims)
    }
}
