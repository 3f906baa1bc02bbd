//! API credential storage
//!
//! The signed-in account is kept in the OS keyring as a small JSON record.
//! Only the email is exposed to the rest of the app as a [`Session`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub email: String,
}

impl Session {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Read/clear access to the current session
pub trait CredentialStore {
    fn current_session(&self) -> Option<Session>;
    fn clear_session(&self);
}

/// Record persisted in the keyring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub email: String,
    pub password: String,
    pub saved_at: DateTime<Utc>,
}

/// Errors that can occur with credential storage
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyring-backed credential store
pub struct KeyringCredentialStore {
    entry: keyring::Entry,
}

impl KeyringCredentialStore {
    const SERVICE: &'static str = "Lockdown";
    const USER: &'static str = "api-credentials";

    pub fn new() -> Result<Self, CredentialError> {
        let entry = keyring::Entry::new(Self::SERVICE, Self::USER)?;
        Ok(Self { entry })
    }

    /// Load the stored record, `None` when nothing is stored
    pub fn load(&self) -> Result<Option<StoredCredentials>, CredentialError> {
        match self.entry.get_password() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store credentials, replacing any existing record
    pub fn save_credentials(&self, email: &str, password: &str) -> Result<Session, CredentialError> {
        let record = StoredCredentials {
            email: email.trim().to_string(),
            password: password.to_string(),
            saved_at: Utc::now(),
        };
        let json = serde_json::to_string(&record)?;
        self.entry.set_password(&json)?;
        Ok(Session::new(record.email))
    }

    /// Remove the stored record. Removing nothing is not an error.
    pub fn delete(&self) -> Result<(), CredentialError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn current_session(&self) -> Option<Session> {
        match self.load() {
            Ok(record) => record.map(|r| Session::new(r.email)),
            Err(e) => {
                tracing::warn!("Failed to read API credentials: {}", e);
                None
            }
        }
    }

    fn clear_session(&self) {
        match self.delete() {
            Ok(()) => tracing::info!("Cleared API credentials"),
            Err(e) => tracing::warn!("Failed to clear API credentials: {}", e),
        }
    }
}
