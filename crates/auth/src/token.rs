//! HS256 bearer-token codec.
//!
//! Signature handling is delegated to `jsonwebtoken`; the deterministic
//! claim-window check lives in [`crate::claims::validate_claims`] so it can
//! be tested without key material.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, AuthClaims, TokenValidationError};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(String),

    #[error("token rejected: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verify a presented bearer token into claims.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, TokenError>;
}

/// Symmetric HS256 codec. All API instances must share the same secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, TokenError> {
        // The time window is checked by `validate_claims` against the caller's
        // clock, so the library's own exp handling is disabled.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<AuthClaims>(token, &self.decoding, &validation)
            .map_err(|e| TokenError::Decode(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use salesdesk_core::UserId;

    use crate::Role;

    fn claims_valid_for(minutes: i64) -> AuthClaims {
        let now = Utc::now();
        AuthClaims {
            sub: UserId::new(),
            name: "Test User".to_string(),
            email: "user@example.com".to_string(),
            role: Role::Manager,
            issued_at: now,
            expires_at: now + Duration::minutes(minutes),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let claims = claims_valid_for(10);

        let token = codec.issue(&claims).unwrap();
        let verified = codec.verify(&token, Utc::now()).unwrap();

        assert_eq!(verified.sub, claims.sub);
        assert_eq!(verified.email, claims.email);
        assert_eq!(verified.role, Role::Manager);
    }

    #[test]
    fn rejects_token_signed_with_different_secret() {
        let codec = Hs256TokenCodec::new(b"secret-a");
        let other = Hs256TokenCodec::new(b"secret-b");

        let token = codec.issue(&claims_valid_for(10)).unwrap();
        assert!(matches!(
            other.verify(&token, Utc::now()),
            Err(TokenError::Decode(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let token = codec.issue(&claims_valid_for(10)).unwrap();

        let later = Utc::now() + Duration::minutes(11);
        assert!(matches!(
            codec.verify(&token, later),
            Err(TokenError::Claims(TokenValidationError::Expired))
        ));
    }

    #[test]
    fn rejects_garbage_token() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        assert!(matches!(
            codec.verify("not-a-token", Utc::now()),
            Err(TokenError::Decode(_))
        ));
    }
}
