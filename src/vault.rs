use anyhow::{Context, Result};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::backend::{NewRecord, SecretPatch, SecretQuery, SecretRecord, SecretStore, Session};
use crate::crypto::{self, Salt};
use crate::error::CryptoError;

/// A credential as entered by the user, before encryption.
#[derive(Default)]
pub struct NewSecret {
    pub service: String,
    pub username: String,
    pub password: Zeroizing<String>,
    pub is_private: bool,
    pub notes: String,
}

/// Fields to change on an existing credential.
#[derive(Default)]
pub struct SecretUpdate {
    pub service: Option<String>,
    pub username: Option<String>,
    pub password: Option<Zeroizing<String>>,
    pub is_private: Option<bool>,
    pub notes: Option<String>,
}

/// Secret store access bound to one user's master password and salt.
///
/// Plaintext passwords never reach the store: they are encrypted on the way
/// in and only decrypted on explicit request. The key is derived again for
/// every operation.
pub struct Vault<S: SecretStore> {
    store: S,
    master_password: Zeroizing<String>,
    salt: Salt,
}

impl<S: SecretStore> Vault<S> {
    pub fn new(store: S, master_password: Zeroizing<String>, salt: Salt) -> Self {
        Self {
            store,
            master_password,
            salt,
        }
    }

    /// Binds the vault to the salt of the session's user.
    pub fn open(store: S, session: &Session, master_password: Zeroizing<String>) -> Result<Self> {
        let salt = Salt::from_base64(&session.user.salt).context("account salt is unusable")?;
        Ok(Self::new(store, master_password, salt))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn fetch_secrets(&self) -> Result<Vec<SecretRecord>> {
        self.store.list(&SecretQuery::all())
    }

    pub fn search_secrets(&self, query: &str) -> Result<Vec<SecretRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return self.fetch_secrets();
        }
        self.store.list(&SecretQuery::service(query))
    }

    pub fn get_secret(&self, id: &str) -> Result<SecretRecord> {
        self.store.get(id)
    }

    pub fn reveal(&self, record: &SecretRecord) -> Result<Zeroizing<String>, CryptoError> {
        self.decrypt_secret_data(&record.secret).inspect_err(|_| {
            warn!(id = %record.id, "secret could not be decrypted");
        })
    }

    pub fn decrypt_secret_data(&self, blob: &str) -> Result<Zeroizing<String>, CryptoError> {
        crypto::decrypt(blob, &self.master_password, &self.salt)
    }

    pub fn create_secret(&self, secret: NewSecret) -> Result<SecretRecord> {
        let blob = crypto::encrypt(&secret.password, &self.master_password, &self.salt)?;

        let record = self.store.insert(NewRecord {
            service: secret.service,
            username: secret.username,
            secret: blob,
            is_private: secret.is_private,
            notes: secret.notes,
        })?;

        debug!(id = %record.id, "secret created");
        Ok(record)
    }

    /// Only a new password is re-encrypted; other fields pass through.
    pub fn update_secret(&self, id: &str, updates: SecretUpdate) -> Result<SecretRecord> {
        let secret = updates
            .password
            .map(|pw| crypto::encrypt(&pw, &self.master_password, &self.salt))
            .transpose()?;

        self.store.update(
            id,
            SecretPatch {
                service: updates.service,
                username: updates.username,
                secret,
                is_private: updates.is_private,
                notes: updates.notes,
            },
        )
    }

    pub fn delete_secret(&self, id: &str) -> Result<()> {
        self.store.soft_delete(id)
    }
}
