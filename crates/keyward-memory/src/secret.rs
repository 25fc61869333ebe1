//! Argon2 hashing for client secrets and resource owner passwords.
//!
//! Hashes are PHC strings produced by Argon2id with default parameters and
//! a random salt from `OsRng`, so hashing the same secret twice yields two
//! different strings that both verify.
//!
//! # Example
//!
//! ```
//! use keyward_memory::secret::{hash_secret, verify_secret};
//!
//! let hash = hash_secret("testclient").unwrap();
//! assert!(verify_secret("testclient", &hash).unwrap());
//! assert!(!verify_secret("boo", &hash).unwrap());
//! ```

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hashes a secret for storage.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if hashing fails (rare).
pub fn hash_secret(secret: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verifies a secret against a stored PHC hash.
///
/// # Errors
///
/// Returns `argon2::password_hash::Error` if the stored hash is malformed.
/// A wrong secret is `Ok(false)`.
pub fn verify_secret(secret: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
