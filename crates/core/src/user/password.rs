//! Password hashing with Argon2id.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{RentalError, RentalResult};

/// Hashes a password into a PHC string.
///
/// # Errors
///
/// Returns `RentalError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> RentalResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RentalError::PasswordHash(e.to_string()))
}

/// Verifies a password against a stored PHC hash.
///
/// A wrong password is `Ok(false)`; only a malformed hash or a failure inside
/// Argon2 is an error.
///
/// # Errors
///
/// Returns `RentalError::PasswordHash` if the hash cannot be parsed or checked.
pub fn verify_password(password: &str, hash: &str) -> RentalResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| RentalError::PasswordHash("invalid password hash format".to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(RentalError::PasswordHash(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_uses_argon2id() {
        let hash = hash_password("desk-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("desk-password").unwrap();
        assert!(verify_password("desk-password", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_same_password_gets_fresh_salt() {
        let first = hash_password("desk-password").unwrap();
        let second = hash_password("desk-password").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(matches!(
            verify_password("desk-password", "not-a-hash"),
            Err(RentalError::PasswordHash(_))
        ));
    }
}
