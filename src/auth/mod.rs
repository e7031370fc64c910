pub mod credentials;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Role every caller of the task API must hold.
pub const ROLE_USER: &str = "USER";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(subject: impl Into<String>, roles: Vec<String>, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            sub: subject.into(),
            roles,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Caller identity for the duration of one request, built from verified claims.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.sub,
            roles: claims.roles,
        }
    }
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("token generation failed: {0}")]
    Encoding(String),
}

/// Issues and verifies HS256 bearer tokens with a server-held secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl: Duration::seconds(ttl_seconds.min(i32::MAX as u64) as i64),
        }
    }

    pub fn from_config(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.as_bytes(), security.jwt_ttl_seconds)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    pub fn issue(&self, username: &str, roles: &[String]) -> Result<String, TokenError> {
        self.issue_at(username, roles, Utc::now())
    }

    pub fn issue_at(&self, username: &str, roles: &[String], issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims::new(username, roles.to_vec(), issued_at, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"unit-test-secret-with-at-least-32-bytes!";

    fn roles() -> Vec<String> {
        vec![ROLE_USER.to_string()]
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = TokenService::new(SECRET, 3600);
        let token = tokens.issue("user", &roles()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user");
        assert_eq!(claims.roles, roles());
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(SECRET, 60);
        let token = tokens
            .issue_at("user", &roles(), Utc::now() - Duration::seconds(120))
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let ours = TokenService::new(SECRET, 3600);
        let theirs = TokenService::new(b"some-other-secret-that-is-also-long-enough", 3600);
        let token = theirs.issue("user", &roles()).unwrap();

        assert!(matches!(ours.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = TokenService::new(SECRET, 3600);
        let token = tokens.issue("user", &roles()).unwrap();
        let admin = tokens.issue("admin", &roles()).unwrap();

        // Splice the admin payload onto the user's signature
        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);

        assert!(matches!(tokens.verify(&forged), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let tokens = TokenService::new(SECRET, 3600);
        assert!(matches!(tokens.verify("not-a-token"), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn tokens_issued_together_differ() {
        let tokens = TokenService::new(SECRET, 3600);
        let a = tokens.issue("user", &roles()).unwrap();
        let b = tokens.issue("user", &roles()).unwrap();
        assert_ne!(a, b);
    }
}
