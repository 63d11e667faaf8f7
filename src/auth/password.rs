//! Password hashing and temporary password generation.

use crate::types::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::{distr::Alphanumeric, Rng, TryRngCore};
use std::sync::OnceLock;

/// Length of invitation passwords when the caller does not choose one.
pub const DEFAULT_TEMP_PASSWORD_LENGTH: usize = 12;

/// Hashes a password using Argon2id with a fresh random salt.
///
/// Returns a PHC-formatted hash string; the salt and cost parameters are
/// embedded so that [`verify_password`] needs nothing else.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}

/// Verifies a password against a PHC hash.
///
/// A digest that cannot be parsed is treated as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(error = %e, "stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Runs a verification against a throwaway hash and returns `false`.
///
/// Used when no account matches, so that an unknown email costs the same
/// Argon2 work as a wrong password.
pub fn verify_dummy(password: &str) -> bool {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = DUMMY_HASH.get_or_init(|| hash_password(&generate_temporary(16)).ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
    false
}

/// Generates a random password of ASCII letters and digits drawn from the OS RNG.
pub fn generate_temporary(length: usize) -> String {
    let mut rng = rand::rngs::OsRng.unwrap_err();
    (0..length)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}
