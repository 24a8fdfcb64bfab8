//! Authentication primitives
//!
//! Argon2 password hashes, HS256 access tokens, hashed one-shot reset
//! tokens and the role/ownership checks catalog services run.

mod access;
mod password;
mod reset;
mod token;

pub use access::{authorize, ensure_owner, Actor};
pub use password::{check_strength, hash_password, verify_password, MIN_PASSWORD_LEN};
pub use reset::{hash_reset_token, reset_ttl, ResetToken};
pub use token::{Claims, JwtConfig, TokenManager, DEFAULT_EXPIRE_DAYS};
