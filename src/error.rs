use std::fmt;

/// Failures of the key derivation and cipher units.
///
/// `MalformedRecord` and `DecryptionFailed` deliberately render the same
/// message so callers cannot surface which check rejected a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    InvalidSalt { found: usize },
    MalformedRecord,
    DecryptionFailed,
    Primitive(&'static str),
    EmptyAlphabet,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidSalt { found } => {
                write!(f, "salt must be exactly 16 bytes, got {found}")
            }
            CryptoError::MalformedRecord | CryptoError::DecryptionFailed => {
                write!(f, "decryption failed")
            }
            CryptoError::Primitive(what) => write!(f, "cryptographic backend failure: {what}"),
            CryptoError::EmptyAlphabet => {
                write!(f, "at least one character class must be selected")
            }
        }
    }
}

impl std::error::Error for CryptoError {}

/// Failures reported by the authentication and secret-store collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    NotSignedIn,
    InvalidCredentials,
    UserExists(String),
    InvalidInput(&'static str),
    SecretNotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotSignedIn => write!(f, "no active session, sign in first"),
            StoreError::InvalidCredentials => write!(f, "invalid login credentials"),
            StoreError::UserExists(id) => write!(f, "user '{id}' already registered"),
            StoreError::InvalidInput(what) => write!(f, "invalid input: {what}"),
            StoreError::SecretNotFound(id) => write!(f, "secret '{id}' not found"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_and_auth_failure_are_indistinguishable_in_text() {
        assert_eq!(
            CryptoError::MalformedRecord.to_string(),
            CryptoError::DecryptionFailed.to_string()
        );
    }
}
