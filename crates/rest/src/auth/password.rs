//! Password hashing.
//!
//! Passwords are stored as Argon2id hashes in PHC string format. Hashing is
//! CPU bound, so the async wrappers move it onto the blocking pool.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use rand::{Rng, distributions::Alphanumeric};

use super::MIN_PASSWORD_LEN;
use crate::error::{RestError, RestResult};

/// Length of generated owner passwords.
const GENERATED_PASSWORD_LEN: usize = 20;

/// Never matches. Verified against when a login email is unknown so that
/// the response costs the same as a wrong password. Parameters must equal
/// `Argon2::default()`.
const UNMATCHABLE_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> RestResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RestError::internal(format!("Failed to hash password: {}", e)))
}

/// Checks a password against a stored PHC hash.
///
/// A malformed stored hash never matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            false
        }
    }
}

/// Rejects passwords shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_password_strength(field: &str, password: &str) -> RestResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(RestError::validation(format!(
            "Invalid value for field '{}': must be at least {} characters",
            field, MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Generates a random alphanumeric password.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Hashes on the blocking pool.
pub(crate) async fn hash_password_blocking(password: String) -> RestResult<String> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| RestError::internal(format!("Password hashing task failed: {}", e)))?
}

/// Verifies on the blocking pool.
pub(crate) async fn verify_password_blocking(password: String, hash: String) -> RestResult<bool> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| RestError::internal(format!("Password verification task failed: {}", e)))
}

/// Spends one full verification on a password that has no account.
pub(crate) async fn verify_against_unknown_account(password: String) -> RestResult<()> {
    verify_password_blocking(password, UNMATCHABLE_HASH.to_string())
        .await
        .map(|_| ())
}
