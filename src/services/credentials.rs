//! Password digests.
//!
//! New digests are salted Argon2id PHC strings. Accounts imported from the
//! previous backend carry an unsalted SHA-256 hex digest; those still verify
//! and are flagged for rehashing so the caller can upgrade them in place.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct HashingError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestScheme {
    Argon2,
    LegacySha256,
    Unknown,
}

pub fn hash_password(password: &str) -> Result<String, HashingError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| HashingError(e.to_string()))
}

pub fn verify_password(password: &str, stored: &str) -> bool {
    match digest_scheme(stored) {
        DigestScheme::Argon2 => match PasswordHash::new(stored) {
            Ok(parsed_hash) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
            Err(_) => false,
        },
        DigestScheme::LegacySha256 => legacy_digest(password).eq_ignore_ascii_case(stored),
        DigestScheme::Unknown => false,
    }
}

/// Runs [`hash_password`] on the blocking pool so Argon2 does not stall the
/// async workers.
pub async fn hash_password_blocking(password: &str) -> Result<String, HashingError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| HashingError(e.to_string()))?
}

/// Runs [`verify_password`] on the blocking pool. A panicked task counts as a
/// mismatch.
pub async fn verify_password_blocking(password: &str, stored: &str) -> bool {
    let password = password.to_owned();
    let stored = stored.to_owned();
    match tokio::task::spawn_blocking(move || verify_password(&password, &stored)).await {
        Ok(verified) => verified,
        Err(e) => {
            tracing::error!("Password verification task failed: {}", e);
            false
        }
    }
}

pub fn needs_rehash(stored: &str) -> bool {
    digest_scheme(stored) != DigestScheme::Argon2
}

pub fn digest_scheme(stored: &str) -> DigestScheme {
    if stored.starts_with("$argon2") {
        DigestScheme::Argon2
    } else if stored.len() == 64 && stored.bytes().all(|b| b.is_ascii_hexdigit()) {
        DigestScheme::LegacySha256
    } else {
        DigestScheme::Unknown
    }
}

/// Single-pass unsalted SHA-256, hex encoded. Only used to check digests
/// written by the previous backend.
pub fn legacy_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
