//! Secret hashing utilities (account passwords and the admin-panel PIN)

use bcrypt::{hash, verify};

pub use bcrypt::DEFAULT_COST;

/// Lowest cost bcrypt accepts; only sensible for tests.
pub const MIN_COST: u32 = 4;

/// Hash a secret using bcrypt
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    hash(secret, cost)
}

/// Verify a secret against a hash. bcrypt compares digests in constant time.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, bcrypt::BcryptError> {
    verify(secret, hash)
}
