//! Session token handling
//!
//! Sessions are short-lived HS256 JWTs that carry identity only (email and
//! display name). Authorization state is deliberately absent: the role is
//! re-read from the users table on every request, so a demotion takes
//! effect on the victim's next request without re-login.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer written into every session token
pub const SESSION_ISSUER: &str = "idealab-server";

/// Audience written into every session token
pub const SESSION_AUDIENCE: &str = "idealab-web";

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject: the signed-in email
    pub sub: String,
    /// Display name from the identity provider
    pub name: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl SessionClaims {
    pub fn new(email: String, name: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: email,
            name,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: SESSION_ISSUER.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Session token errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Session expired")]
    Expired,

    #[error("Invalid session token")]
    Invalid,
}

/// Issues and verifies session tokens with a shared HMAC secret
///
/// Verification checks the signature and expiration only; issuer and
/// audience are informational (single-service deployment).
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionTokens {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a session token for a signed-in identity
    pub fn issue(
        &self,
        email: &str,
        name: &str,
        validity: Duration,
    ) -> Result<String, SessionError> {
        let claims = SessionClaims::new(email.to_string(), name.to_string(), validity);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verify a session token and return its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = SessionTokens::new(b"test-secret");

        let token = tokens
            .issue("alice@poornima.org", "Alice", Duration::hours(24))
            .expect("Failed to issue token");
        assert!(token.starts_with("eyJ"));

        let claims = tokens.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.sub, "alice@poornima.org");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = SessionTokens::new(b"test-secret");

        let token = tokens
            .issue("alice@poornima.org", "Alice", Duration::seconds(-120))
            .expect("Failed to issue token");

        let err = tokens.verify(&token).expect_err("Expired token accepted");
        assert!(matches!(err, SessionError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tokens = SessionTokens::new(b"test-secret");
        let other = SessionTokens::new(b"other-secret");

        let token = tokens
            .issue("alice@poornima.org", "Alice", Duration::hours(1))
            .expect("Failed to issue token");

        let err = other.verify(&token).expect_err("Forged token accepted");
        assert!(matches!(err, SessionError::Invalid));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = SessionTokens::new(b"test-secret");
        let err = tokens
            .verify("not-a-jwt")
            .expect_err("Garbage token accepted");
        assert!(matches!(err, SessionError::Invalid));
    }
}
