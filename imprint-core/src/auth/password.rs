//! Password hashing

use crate::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Reject passwords shorter than [`MIN_PASSWORD_LEN`] characters
pub fn check_strength(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
    }
    Ok(())
}

/// Check strength, then hash with Argon2id into a PHC string
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    check_strength(password)?;
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::HashingFailed)
}

/// Whether `password` matches the stored hash; unparseable hashes never match
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("123456").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("123456", &hash));
        assert!(!verify_password("1234567", &hash));
    }

    #[test]
    fn test_salted() {
        assert_ne!(hash_password("123456").unwrap(), hash_password("123456").unwrap());
    }

    #[test]
    fn test_too_short() {
        assert_eq!(hash_password("12345"), Err(AuthError::WeakPassword(6)));
    }

    #[test]
    fn test_garbage_hash_never_matches() {
        assert!(!verify_password("123456", "plain-text"));
    }
}
