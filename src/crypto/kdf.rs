use base64::{Engine as _, engine::general_purpose::STANDARD};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroizing;

use super::{KEY_LEN, PBKDF2_ITERATIONS, SALT_LEN, secure_random};
use crate::error::CryptoError;

/// Per-user key derivation salt.
///
/// Stable for the lifetime of an account: a different salt derives a
/// different key and orphans every record encrypted under the old one.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    pub fn generate() -> Result<Self, CryptoError> {
        let mut salt = [0u8; SALT_LEN];
        secure_random(&mut salt)?;
        Ok(Self(salt))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let salt: [u8; SALT_LEN] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidSalt { found: bytes.len() })?;
        Ok(Self(salt))
    }

    /// Decodes the textual (base64) form stored alongside the user.
    pub fn from_base64(text: &str) -> Result<Self, CryptoError> {
        let bytes = STANDARD
            .decode(text.trim())
            .map_err(|_| CryptoError::InvalidSalt { found: 0 })?;
        Self::from_bytes(&bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", self.to_base64())
    }
}

/// Generate a fresh random salt in its base64 storage form
pub fn generate_salt() -> Result<String, CryptoError> {
    Ok(Salt::generate()?.to_base64())
}

/// Derive the record encryption key from the master password.
///
/// PBKDF2-HMAC-SHA256, 100 000 iterations, 256-bit output. The key is
/// never cached; callers derive it per operation and drop it right after.
pub fn derive_key(password: &str, salt: &Salt) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), PBKDF2_ITERATIONS, &mut *key);
    key
}
