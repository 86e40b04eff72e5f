//! Password hashing hook.
//!
//! Passwords are stored as Argon2id PHC strings; the plaintext never reaches
//! the `users` table.

use crate::UserError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// Hashes `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

/// Checks `password` against a stored PHC hash string.
///
/// Returns `Ok(false)` for a wrong password and an error only when the
/// stored hash cannot be parsed.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, UserError> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_original_password_only() {
        let hash = hash_password("muddled-sugar").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("muddled-sugar", &hash).unwrap());
        assert!(!verify_password("shaken-not-stirred", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("bitters").unwrap();
        let second = hash_password("bitters").unwrap();
        assert_ne!(first, second, "salts should differ");
    }

    #[test]
    fn unparseable_hash_is_an_error() {
        assert!(matches!(
            verify_password("bitters", "plaintext"),
            Err(UserError::PasswordHash(_))
        ));
    }
}
