/// Password hashing with Argon2id
///
/// Hashes are produced with Argon2id using the crate's default parameters
/// and a per-password random salt, and verified in constant time by the
/// argon2 crate.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery staple")?;
/// assert!(verify_password("correct horse battery staple", &hash)?);
/// assert!(!verify_password("wrong password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Error type for password operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Stored hash could not be parsed
    #[error("Invalid password hash: {0}")]
    InvalidHash(String),
}

/// Hashes a password with Argon2id and a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verifies a password against a stored hash
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash is malformed.
/// A wrong password is `Ok(false)`, not an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Validates password strength
///
/// Requires at least 8 characters containing both a letter and a digit.
/// Returns a human-readable message suitable for a validation error.
pub fn validate_password_strength(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err("Password must contain at least one letter".to_string());
    }

    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("s3cure-password").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cure-password", &hash).unwrap());
        assert!(!verify_password("other-password", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password1").unwrap();
        let b = hash_password("same-password1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_invalid_hash_rejected() {
        assert!(matches!(
            verify_password("anything", "not-a-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("lettersonly").is_err());
        assert!(validate_password_strength("12345678").is_err());
        assert!(validate_password_strength("password1").is_ok());
    }
}
