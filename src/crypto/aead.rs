//! AES-256-GCM encryption of secret records.
//!
//! Persisted record format:
//! ```text
//! base64( NONCE (12) | CIPHERTEXT | TAG (16) )
//! ```
//! There is no version byte. The format is shared with every other client
//! of the same backend and must stay byte-compatible.

use super::kdf::{Salt, derive_key};
use super::{KEY_LEN, NONCE_LEN, TAG_LEN, secure_random};
use crate::error::CryptoError;
use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use zeroize::Zeroizing;

/// Encrypt a secret under a key derived from the master password.
///
/// A fresh nonce is drawn for every call.
pub fn encrypt(plaintext: &str, password: &str, salt: &Salt) -> Result<String, CryptoError> {
    let mut nonce = [0u8; NONCE_LEN];
    secure_random(&mut nonce)?;
    encrypt_with_nonce(plaintext, password, salt, nonce)
}

/// Decrypt a record produced by [`encrypt`].
///
/// Wrong password, wrong salt and tampered data all fail the tag check and
/// come back as [`CryptoError::DecryptionFailed`]; nothing is released
/// before the tag verifies.
pub fn decrypt(
    blob: &str,
    password: &str,
    salt: &Salt,
) -> Result<Zeroizing<String>, CryptoError> {
    let data = STANDARD
        .decode(blob.trim())
        .map_err(|_| CryptoError::MalformedRecord)?;
    if data.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::MalformedRecord);
    }

    let key = derive_key(password, salt);
    let plaintext = open(&key, &data)?;

    let text = String::from_utf8(plaintext.to_vec()).map_err(|_| CryptoError::DecryptionFailed)?;
    Ok(Zeroizing::new(text))
}

fn encrypt_with_nonce(
    plaintext: &str,
    password: &str,
    salt: &Salt,
    nonce: [u8; NONCE_LEN],
) -> Result<String, CryptoError> {
    let key = derive_key(password, salt);
    let sealed = seal(&key, &nonce, plaintext.as_bytes())?;

    let mut record = Vec::with_capacity(NONCE_LEN + sealed.len());
    record.extend_from_slice(&nonce);
    record.extend_from_slice(&sealed);

    Ok(STANDARD.encode(record))
}

/// Returns ciphertext with the tag appended.
fn seal(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| CryptoError::Primitive("AES-GCM encryption failed"))
}

/// Opens `nonce || ciphertext || tag`. Caller checks the minimum length.
fn open(key: &[u8; KEY_LEN], data: &[u8]) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let (nonce, sealed) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    Ok(Zeroizing::new(plaintext))
}
