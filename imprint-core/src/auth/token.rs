//! Signed access tokens

use crate::error::AuthError;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EXPIRE_DAYS: i64 = 30;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expire_days: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::days(expire_days),
        }
    }
}

/// Issues and validates HS256 tokens
#[derive(Clone)]
pub struct TokenManager {
    ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenManager {
    pub fn new(config: JwtConfig) -> Self {
        Self {
            ttl: config.ttl,
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Sign a token for `user_id`
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    /// Verify signature and expiry, returning the claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager").field("ttl", &self.ttl).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_then_verify() {
        let tokens = TokenManager::new(JwtConfig::new("secret", 30));
        let token = tokens.issue("user-1").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.exp - claims.iat, 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = TokenManager::new(JwtConfig::new("one", 1)).issue("u").unwrap();
        let other = TokenManager::new(JwtConfig::new("two", 1));
        assert_eq!(other.verify(&token), Err(AuthError::MalformedToken));
        assert_eq!(other.verify("not.a.jwt"), Err(AuthError::MalformedToken));
    }

    #[test]
    fn test_expired_token() {
        // Past the default 60s leeway
        let tokens = TokenManager::new(JwtConfig {
            secret: "secret".into(),
            ttl: Duration::minutes(-5),
        });
        let token = tokens.issue("u").unwrap();
        assert_eq!(tokens.verify(&token), Err(AuthError::TokenExpired));
    }
}
