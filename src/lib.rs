//! Client side of the PassGuardian password manager.
//!
//! Secrets are encrypted on the client with AES-256-GCM under a key derived
//! from the master password (PBKDF2-HMAC-SHA256) before they reach the
//! backend, which only ever stores the resulting record:
//!
//! ```text
//! base64( nonce (12) | ciphertext | tag (16) )
//! ```

pub mod backend;
pub mod clipboard;
pub mod config;
pub mod crypto;
pub mod error;
pub mod messages;
mod storage;
pub mod vault;

pub use crate::backend::{AuthService, LocalBackend, SecretStore, Session, User};
pub use crate::config::Config;
pub use crate::crypto::{PasswordOptions, Salt, decrypt, encrypt, generate_password, generate_salt};
pub use crate::error::{CryptoError, StoreError};
pub use crate::vault::{NewSecret, SecretUpdate, Vault};
