//! File-backed stand-in for the hosted backend.
//!
//! Users and secrets live in one JSON document; the active session lives in
//! a second one, the way the mobile client persists its auth session.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{
    AuthService, NewRecord, SecretPatch, SecretQuery, SecretRecord, SecretStore, Session, User,
};
use crate::crypto::{Salt, derive_key, secure_random};
use crate::error::StoreError;
use crate::storage::Storage;

const DB_FILE: &str = "passguardian.db";
const SESSION_FILE: &str = "session.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Database {
    users: Vec<Account>,
    secrets: Vec<SecretRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Account {
    #[serde(flatten)]
    user: User,
    /// Salt for the login verifier, distinct from the vault salt.
    auth_salt: String,
    verifier: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct LocalBackend {
    db: Storage,
    session: Storage,
}

impl LocalBackend {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            db: Storage::new(data_dir.join(DB_FILE)),
            session: Storage::new(data_dir.join(SESSION_FILE)),
        }
    }

    /// Checks `secret` against the account's login verifier.
    pub fn verify_password(&self, user: &User, secret: &str) -> Result<()> {
        let db = self.load()?;
        let account = db
            .users
            .iter()
            .find(|a| a.user.id == user.id)
            .ok_or(StoreError::InvalidCredentials)?;

        if account.matches(secret)? {
            Ok(())
        } else {
            Err(StoreError::InvalidCredentials.into())
        }
    }

    /// The signed-in session, or [`StoreError::NotSignedIn`].
    pub fn require_session(&self) -> Result<Session> {
        self.get_session()?
            .ok_or_else(|| StoreError::NotSignedIn.into())
    }

    fn load(&self) -> Result<Database> {
        Ok(self.db.load()?.unwrap_or_default())
    }

    fn owner(&self) -> Result<String> {
        Ok(self.require_session()?.user.id)
    }
}

impl Account {
    fn matches(&self, secret: &str) -> Result<bool> {
        let salt = Salt::from_base64(&self.auth_salt).context("corrupted account salt")?;
        let expected = hex::decode(&self.verifier).context("corrupted account verifier")?;
        let actual = derive_key(secret, &salt);

        Ok(bool::from(actual.as_slice().ct_eq(&expected)))
    }
}

fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}

fn random_token() -> Result<String> {
    let mut buf = [0u8; 32];
    secure_random(&mut buf)?;
    Ok(hex::encode(buf))
}

impl AuthService for LocalBackend {
    fn sign_in(&self, identifier: &str, secret: &str) -> Result<Session> {
        let email = normalize_identifier(identifier);
        let db = self.load()?;

        let Some(account) = db.users.iter().find(|a| a.user.email == email) else {
            warn!(%email, "sign-in for unknown identifier");
            return Err(StoreError::InvalidCredentials.into());
        };
        if !account.matches(secret)? {
            warn!(%email, "sign-in rejected");
            return Err(StoreError::InvalidCredentials.into());
        }

        let session = Session {
            user: account.user.clone(),
            access_token: random_token()?,
            created_at: Utc::now(),
        };
        self.session.save(&session)?;

        info!(user = %session.user.id, "signed in");
        Ok(session)
    }

    fn sign_up(&self, identifier: &str, secret: &str, display_name: &str) -> Result<User> {
        let email = normalize_identifier(identifier);
        let username = display_name.trim();

        if !email.contains('@') {
            return Err(StoreError::InvalidInput("email").into());
        }
        if secret.is_empty() {
            return Err(StoreError::InvalidInput("password").into());
        }
        if username.is_empty() {
            return Err(StoreError::InvalidInput("username").into());
        }

        let mut db = self.load()?;
        if db.users.iter().any(|a| a.user.email == email) {
            return Err(StoreError::UserExists(email).into());
        }

        let auth_salt = Salt::generate()?;
        let verifier = hex::encode(derive_key(secret, &auth_salt).as_slice());
        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            username: username.to_string(),
            salt: Salt::generate()?.to_base64(),
        };

        db.users.push(Account {
            user: user.clone(),
            auth_salt: auth_salt.to_base64(),
            verifier,
            created_at: Utc::now(),
        });
        self.db.save(&db)?;

        info!(user = %user.id, "account created");
        Ok(user)
    }

    fn sign_out(&self) -> Result<()> {
        self.session.remove()?;
        debug!("session cleared");
        Ok(())
    }

    fn get_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.session.load::<Session>()? else {
            return Ok(None);
        };

        // a session for an account that no longer exists is stale
        let db = self.load()?;
        if db.users.iter().any(|a| a.user.id == session.user.id) {
            Ok(Some(session))
        } else {
            Ok(None)
        }
    }
}

impl SecretStore for LocalBackend {
    fn list(&self, query: &SecretQuery) -> Result<Vec<SecretRecord>> {
        let owner = self.owner()?;
        let db = self.load()?;

        let mut rows: Vec<SecretRecord> = db
            .secrets
            .into_iter()
            .filter(|r| r.owner == owner && query.matches(r))
            .collect();
        // newest insert wins ties on the timestamp
        rows.reverse();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(rows)
    }

    fn get(&self, id: &str) -> Result<SecretRecord> {
        let owner = self.owner()?;
        self.load()?
            .secrets
            .into_iter()
            .find(|r| r.id == id && r.owner == owner && !r.deleted)
            .ok_or_else(|| StoreError::SecretNotFound(id.to_string()).into())
    }

    fn insert(&self, record: NewRecord) -> Result<SecretRecord> {
        let owner = self.owner()?;
        let mut db = self.load()?;

        let row = SecretRecord {
            id: Uuid::new_v4().to_string(),
            owner,
            service: record.service,
            username: record.username,
            secret: record.secret,
            is_private: record.is_private,
            notes: record.notes,
            deleted: false,
            created_at: Utc::now(),
        };
        db.secrets.push(row.clone());
        self.db.save(&db)?;

        debug!(id = %row.id, "secret inserted");
        Ok(row)
    }

    fn update(&self, id: &str, patch: SecretPatch) -> Result<SecretRecord> {
        let owner = self.owner()?;
        let mut db = self.load()?;

        let row = db
            .secrets
            .iter_mut()
            .find(|r| r.id == id && r.owner == owner && !r.deleted)
            .ok_or_else(|| StoreError::SecretNotFound(id.to_string()))?;

        if let Some(service) = patch.service {
            row.service = service;
        }
        if let Some(username) = patch.username {
            row.username = username;
        }
        if let Some(secret) = patch.secret {
            row.secret = secret;
        }
        if let Some(is_private) = patch.is_private {
            row.is_private = is_private;
        }
        if let Some(notes) = patch.notes {
            row.notes = notes;
        }
        let updated = row.clone();
        self.db.save(&db)?;

        debug!(%id, "secret updated");
        Ok(updated)
    }

    fn soft_delete(&self, id: &str) -> Result<()> {
        let owner = self.owner()?;
        let mut db = self.load()?;

        let row = db
            .secrets
            .iter_mut()
            .find(|r| r.id == id && r.owner == owner && !r.deleted)
            .ok_or_else(|| StoreError::SecretNotFound(id.to_string()))?;
        row.deleted = true;
        self.db.save(&db)?;

        debug!(%id, "secret soft-deleted");
        Ok(())
    }
}
