//! Password hashing port

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordHashError(pub String);

/// One-way hashing and verification of user credentials.
///
/// `verify_password` never errors: a mismatch and a malformed stored hash
/// both come back as `false`.
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, plaintext: &str) -> Result<String, PasswordHashError>;

    fn verify_password(&self, plaintext: &str, hash: &str) -> bool;
}
