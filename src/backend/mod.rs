//! Interfaces to the hosted authentication service and secret table.
//!
//! The crypto core never talks to these directly; [`crate::Vault`] sits in
//! between and only ever hands the store ciphertext.

pub mod local;

pub use local::LocalBackend;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account as exposed to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    /// Base64 key derivation salt, generated once at sign-up.
    pub salt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

/// A row of the `secrets` table. `secret` is always an encrypted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    pub id: String,
    pub owner: String,
    pub service: String,
    pub username: String,
    pub secret: String,
    pub is_private: bool,
    pub notes: String,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Row to insert; the store assigns id, owner and timestamp.
#[derive(Debug, Clone, Default)]
pub struct NewRecord {
    pub service: String,
    pub username: String,
    pub secret: String,
    pub is_private: bool,
    pub notes: String,
}

/// Partial row update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SecretPatch {
    pub service: Option<String>,
    pub username: Option<String>,
    pub secret: Option<String>,
    pub is_private: Option<bool>,
    pub notes: Option<String>,
}

/// Row filter. Deleted rows are always excluded.
#[derive(Debug, Clone, Default)]
pub struct SecretQuery {
    /// Case-insensitive substring match on `service`.
    pub service: Option<String>,
}

impl SecretQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn service(term: &str) -> Self {
        Self {
            service: Some(term.to_string()),
        }
    }

    pub fn matches(&self, record: &SecretRecord) -> bool {
        if record.deleted {
            return false;
        }
        match &self.service {
            Some(term) => record
                .service
                .to_lowercase()
                .contains(&term.to_lowercase()),
            None => true,
        }
    }
}

pub trait AuthService {
    fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session>;
    fn sign_up(&self, identifier: &str, secret: &str, display_name: &str) -> Result<User>;
    fn sign_out(&self) -> Result<()>;
    fn get_session(&self) -> Result<Option<Session>>;
}

pub trait SecretStore {
    /// Matching rows, newest first.
    fn list(&self, query: &SecretQuery) -> Result<Vec<SecretRecord>>;
    fn get(&self, id: &str) -> Result<SecretRecord>;
    fn insert(&self, record: NewRecord) -> Result<SecretRecord>;
    fn update(&self, id: &str, patch: SecretPatch) -> Result<SecretRecord>;
    /// Flags the row as deleted; it is never physically removed.
    fn soft_delete(&self, id: &str) -> Result<()>;
}
