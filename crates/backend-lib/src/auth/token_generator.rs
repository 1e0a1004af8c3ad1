// ============================
// crates/backend-lib/src/auth/token_generator.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for session identifiers
Tokens are drawn straight from the operating system's CSPRNG and carry
no structure beyond their entropy. */
use rand::{rngs::OsRng, TryRngCore};
use thiserror::Error;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// The OS random source refused to produce bytes
#[derive(Debug, Error)]
#[error("secure random source unavailable: {0}")]
pub struct TokenError(String);

/** Generate a cryptographically secure random token
# Returns
A base64 URL-safe encoded string without padding, or `TokenError` when
the OS random source fails */
pub fn generate_secure_token() -> Result<String, TokenError> {
    generate_secure_token_with_size(DEFAULT_TOKEN_BYTES)
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> Result<String, TokenError> {
    let mut buffer = vec![0u8; bytes];
    OsRng
        .try_fill_bytes(&mut buffer)
        .map_err(|e| TokenError(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(buffer))
}
