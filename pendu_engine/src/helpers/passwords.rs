//! Password derivation.
//!
//! Stored hashes are produced by first hashing the plaintext with SHA-256 and feeding the hex digest into
//! PBKDF2-HMAC with the record's salt, iteration count, digest algorithm and output length. Verification
//! re-derives with the stored parameters and compares the hex output. The derivation is deterministic for a
//! fixed parameter set, which is what makes wholesale password-record replacement safe.

use pbkdf2::pbkdf2_hmac;
use rand::{thread_rng, RngCore};
use sha2::{Digest, Sha256, Sha512};
use thiserror::Error;

use crate::db_types::StoredPassword;

pub const DEFAULT_ITERATIONS: u32 = 12_345;
pub const DEFAULT_ALGORITHM: &str = "sha512";
pub const DEFAULT_HASH_LENGTH: usize = 64;
const SALT_BYTES: usize = 32;

#[derive(Debug, Clone, Error)]
pub enum PasswordHashError {
    #[error("Unsupported digest algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid derivation parameters: {0}")]
    InvalidParameters(String),
}

/// Optional overrides for [`hash_password`]. Any field left as `None` falls back to the module defaults
/// (fresh random salt, 12345 iterations, sha512, 64 bytes).
#[derive(Debug, Clone, Default)]
pub struct HashParams {
    pub salt: Option<String>,
    pub iterations: Option<u32>,
    pub algorithm: Option<String>,
    pub length: Option<usize>,
}

impl HashParams {
    /// The parameter set stored alongside an existing hash, used to re-derive during verification.
    pub fn from_stored(stored: &StoredPassword) -> Self {
        Self {
            salt: Some(stored.salt.clone()),
            iterations: Some(stored.iterations),
            algorithm: Some(stored.algorithm.clone()),
            length: Some(stored.length),
        }
    }
}

/// Derives a full [`StoredPassword`] record from a plaintext password.
pub fn hash_password(password: &str, params: HashParams) -> Result<StoredPassword, PasswordHashError> {
    let salt = params.salt.unwrap_or_else(random_salt);
    let iterations = params.iterations.unwrap_or(DEFAULT_ITERATIONS);
    let algorithm = params.algorithm.unwrap_or_else(|| DEFAULT_ALGORITHM.to_string());
    let length = params.length.unwrap_or(DEFAULT_HASH_LENGTH);
    if iterations == 0 {
        return Err(PasswordHashError::InvalidParameters("iteration count must be non-zero".to_string()));
    }
    if length == 0 {
        return Err(PasswordHashError::InvalidParameters("output length must be non-zero".to_string()));
    }
    let prehash = hex::encode(Sha256::digest(password.as_bytes()));
    let mut output = vec![0u8; length];
    match algorithm.as_str() {
        "sha256" => pbkdf2_hmac::<Sha256>(prehash.as_bytes(), salt.as_bytes(), iterations, &mut output),
        "sha512" => pbkdf2_hmac::<Sha512>(prehash.as_bytes(), salt.as_bytes(), iterations, &mut output),
        other => return Err(PasswordHashError::UnsupportedAlgorithm(other.to_string())),
    }
    Ok(StoredPassword { salt, iterations, algorithm, length, hash: hex::encode(output) })
}

/// Re-derives the hash for `password` with the parameters stored in `stored` and compares the result.
pub fn verify_password(password: &str, stored: &StoredPassword) -> Result<bool, PasswordHashError> {
    let recomputed = hash_password(password, HashParams::from_stored(stored))?;
    Ok(recomputed.hash == stored.hash)
}

fn random_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixed_params() -> HashParams {
        HashParams {
            salt: Some("salt".to_string()),
            iterations: Some(12345),
            algorithm: Some("sha512".to_string()),
            length: Some(64),
        }
    }

    #[test]
    fn hashing_is_deterministic_for_fixed_parameters() {
        let a = hash_password("test", fixed_params()).unwrap();
        let b = hash_password("test", fixed_params()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.hash.len(), 128, "64 output bytes hex-encode to 128 characters");
        assert_eq!(a.salt, "salt");
        assert_eq!(a.iterations, 12345);
        assert_eq!(a.algorithm, "sha512");
        assert_eq!(a.length, 64);
    }

    #[test]
    fn different_passwords_produce_different_hashes() {
        let a = hash_password("test", fixed_params()).unwrap();
        let b = hash_password("wrong", fixed_params()).unwrap();
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn omitted_salt_is_randomised() {
        let a = hash_password("test", HashParams::default()).unwrap();
        let b = hash_password("test", HashParams::default()).unwrap();
        assert_eq!(a.salt.len(), 64, "32 salt bytes hex-encode to 64 characters");
        assert_ne!(a.salt, b.salt);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn verification_round_trips() {
        let stored = hash_password("test", HashParams::default()).unwrap();
        assert!(verify_password("test", &stored).unwrap());
        assert!(!verify_password("wrong", &stored).unwrap());
    }

    #[test]
    fn sha256_derivation_is_supported() {
        let mut params = fixed_params();
        params.algorithm = Some("sha256".to_string());
        let stored = hash_password("test", params).unwrap();
        assert!(verify_password("test", &stored).unwrap());
    }

    #[test]
    fn bogus_parameters_are_rejected() {
        let mut params = fixed_params();
        params.algorithm = Some("md5".to_string());
        assert!(matches!(hash_password("test", params), Err(PasswordHashError::UnsupportedAlgorithm(_))));
        let mut params = fixed_params();
        params.iterations = Some(0);
        assert!(matches!(hash_password("test", params), Err(PasswordHashError::InvalidParameters(_))));
    }
}
