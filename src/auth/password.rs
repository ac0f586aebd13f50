/// Password Hashing and Verification
///
/// bcrypt with a per-password salt; verification is constant-time inside
/// bcrypt. Plaintext passwords are hashed at registration and never stored
/// or logged.
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_never_the_plaintext() {
        let password = "testpassword";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hashed);
        assert!(hashed.starts_with("$2"));
    }

    #[test]
    fn correct_password_verifies() {
        let password = "testpassword";
        let hashed = hash_password(password).expect("Failed to hash password");

        assert!(verify_password(password, &hashed).expect("Failed to verify"));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let hashed = hash_password("testpassword").expect("Failed to hash password");

        assert!(!verify_password("otherpassword", &hashed).expect("Failed to verify"));
    }

    #[test]
    fn same_password_hashes_differently() {
        // Salted: two hashes of one password must not collide
        let first = hash_password("testpassword").unwrap();
        let second = hash_password("testpassword").unwrap();
        assert_ne!(first, second);
    }
}
