//! Client-side cryptography for stored secrets.
//!
//! Provides key derivation, authenticated encryption of secret records,
//! and the random salt / password generators.

pub mod aead;
pub mod kdf;
pub mod password;

pub use aead::{decrypt, encrypt};
pub use kdf::{Salt, derive_key, generate_salt};
pub use password::{PasswordOptions, generate_password};

use crate::error::CryptoError;
use getrandom::fill;

/// Length of the per-user salt (16 bytes).
pub const SALT_LEN: usize = 16;
/// Length of the AES-GCM nonce (12 bytes).
pub const NONCE_LEN: usize = 12;
/// Length of the AES-GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of the derived key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// PBKDF2-HMAC-SHA256 iteration count.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    fill(buf).map_err(|_| CryptoError::Primitive("OS random generator unavailable"))
}
