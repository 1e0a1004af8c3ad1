// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password hashing and verification.
//!
//! Hashes are PHC strings (`$scrypt$...` or `$argon2id$...`) carrying their
//! own salt and cost parameters, so a hash keeps verifying after the
//! configured work factor or algorithm changes.
use crate::config::{HashAlgorithm, HashingSettings};
use argon2::{Algorithm, Argon2, Version};
use rand::{rngs::OsRng, TryRngCore};
use scrypt::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Scrypt,
};
use thiserror::Error;

/// Salt size in bytes
const SALT_BYTES: usize = 16;

/// scrypt derived key length
const SCRYPT_OUTPUT_LEN: usize = 32;

/// Plaintext hashed once to produce the hash compared against when a login
/// names an unknown user.
const DUMMY_PASSWORD: &str = "dummy-password-for-unknown-users";

/// Hashing failures. All of them are fatal for the current request.
#[derive(Debug, Error)]
pub enum HashingError {
    #[error("salt generation failed: {0}")]
    Rng(String),

    #[error("password hashing failed: {0}")]
    Algorithm(#[from] scrypt::password_hash::Error),

    #[error("invalid work factor: {0}")]
    Params(String),
}

#[derive(Debug, Clone)]
enum Kdf {
    Scrypt(scrypt::Params),
    Argon2(argon2::Params),
}

/// Hashes new passwords with the configured algorithm and verifies
/// candidates against stored hashes.
#[derive(Debug)]
pub struct CredentialVerifier {
    kdf: Kdf,
    dummy_hash: String,
}

impl CredentialVerifier {
    /// Build a verifier from the configured work factor. The dummy hash is
    /// computed here so no login pays for it.
    pub fn new(settings: &HashingSettings) -> Result<Self, HashingError> {
        let kdf = match settings.algorithm {
            HashAlgorithm::Scrypt => Kdf::Scrypt(
                scrypt::Params::new(
                    settings.scrypt_log_n,
                    settings.scrypt_r,
                    settings.scrypt_p,
                    SCRYPT_OUTPUT_LEN,
                )
                .map_err(|e| HashingError::Params(e.to_string()))?,
            ),
            HashAlgorithm::Argon2 => Kdf::Argon2(
                argon2::Params::new(
                    settings.argon2_m_cost,
                    settings.argon2_t_cost,
                    settings.argon2_p_cost,
                    None,
                )
                .map_err(|e| HashingError::Params(e.to_string()))?,
            ),
        };

        let mut verifier = Self {
            kdf,
            dummy_hash: String::new(),
        };
        verifier.dummy_hash = verifier.hash(DUMMY_PASSWORD)?;
        Ok(verifier)
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, plain: &str) -> Result<String, HashingError> {
        let salt = generate_salt()?;
        let hash = match &self.kdf {
            Kdf::Scrypt(params) => Scrypt
                .hash_password_customized(plain.as_bytes(), None, None, params.clone(), &salt)?
                .to_string(),
            Kdf::Argon2(params) => Argon2::new(Algorithm::Argon2id, Version::V0x13, params.clone())
                .hash_password(plain.as_bytes(), &salt)?
                .to_string(),
        };
        Ok(hash)
    }

    /// Verify a password against a stored hash
    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        verify_password(hash, plain)
    }

    /// Hash of a fixed password under the configured work factor.
    /// Verifying against it costs the same as a real verification.
    pub fn dummy_hash(&self) -> &str {
        &self.dummy_hash
    }
}

/// Verify a password against a PHC hash produced by either supported
/// algorithm. Malformed hashes never match.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    let argon2 = Argon2::default();
    let verifiers: [&dyn PasswordVerifier; 2] = [&Scrypt, &argon2];
    parsed_hash.verify_password(&verifiers, plain).is_ok()
}

fn generate_salt() -> Result<SaltString, HashingError> {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| HashingError::Rng(e.to_string()))?;
    Ok(SaltString::encode_b64(&bytes)?)
}

#[cfg(test)]
pub(crate) fn fast_settings(algorithm: HashAlgorithm) -> HashingSettings {
    HashingSettings {
        algorithm,
        scrypt_log_n: 4,
        scrypt_r: 8,
        scrypt_p: 1,
        argon2_m_cost: 64,
        argon2_t_cost: 1,
        argon2_p_cost: 1,
    }
}
