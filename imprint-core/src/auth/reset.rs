//! Password reset tokens

use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 20;

/// How long a reset token stays valid
pub fn reset_ttl() -> Duration {
    Duration::minutes(10)
}

/// A freshly generated reset token
///
/// `raw` goes to the user; only `hashed` and `expires_at` are stored.
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub raw: String,
    pub hashed: String,
    pub expires_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let raw = hex::encode(bytes);

        Self {
            hashed: hash_reset_token(&raw),
            raw,
            expires_at: Utc::now() + reset_ttl(),
        }
    }
}

/// SHA-256 hex digest, the stored form of a reset token
pub fn hash_reset_token(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate() {
        let token = ResetToken::generate();
        assert_eq!(token.raw.len(), TOKEN_BYTES * 2);
        assert_eq!(token.hashed, hash_reset_token(&token.raw));
        assert_eq!(token.hashed.len(), 64);
        assert!(token.expires_at > Utc::now() + Duration::minutes(9));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(ResetToken::generate().raw, ResetToken::generate().raw);
    }
}
