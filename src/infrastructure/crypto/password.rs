//! Password hashing utilities

use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::warn;

use crate::domain::{PasswordHashError, PasswordHasher};

/// bcrypt-backed [`PasswordHasher`]. The salt is embedded in the digest and
/// `bcrypt::verify` compares in constant time.
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash_password(&self, plaintext: &str) -> Result<String, PasswordHashError> {
        hash(plaintext, self.cost).map_err(|e| PasswordHashError(e.to_string()))
    }

    fn verify_password(&self, plaintext: &str, hash: &str) -> bool {
        match verify(plaintext, hash) {
            Ok(valid) => valid,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> BcryptPasswordHasher {
        // Minimum bcrypt cost keeps the tests fast
        BcryptPasswordHasher::new(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let password = "secure_password_123";
        let hashed = hasher.hash_password(password).unwrap();

        assert_ne!(hashed, password);
        assert!(hasher.verify_password(password, &hashed));
        assert!(!hasher.verify_password("wrong_password", &hashed));
    }

    #[test]
    fn any_altered_password_fails() {
        let hasher = hasher();
        let hashed = hasher.hash_password("Admin@123").unwrap();

        for altered in ["admin@123", "Admin@1234", "Admin@12", " Admin@123", ""] {
            assert!(!hasher.verify_password(altered, &hashed), "{altered:?}");
        }
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify_password("same", &a));
        assert!(hasher.verify_password("same", &b));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!hasher().verify_password("anything", "not-a-bcrypt-hash"));
    }

    #[test]
    fn invalid_cost_is_an_error() {
        assert!(BcryptPasswordHasher::new(2).hash_password("pw").is_err());
    }
}
