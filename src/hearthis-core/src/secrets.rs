//! Account password storage in the OS keyring.
//!
//! Entries live under the service name `hearthis` with the user key
//! `<username>/password`, so several accounts can coexist.

use thiserror::Error;

const SERVICE_NAME: &str = "hearthis";

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("credential not found: {key}")]
    NotFound { key: String },

    #[error("keyring access denied: {0}")]
    AccessDenied(String),

    #[error("keyring unavailable: {0}")]
    Unavailable(String),

    #[error("keyring error: {0}")]
    Other(String),
}

impl From<keyring::Error> for SecretsError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => SecretsError::NotFound {
                key: "unknown".into(),
            },
            keyring::Error::NoStorageAccess(e) => SecretsError::AccessDenied(e.to_string()),
            keyring::Error::PlatformFailure(e) => SecretsError::Unavailable(e.to_string()),
            other => SecretsError::Other(other.to_string()),
        }
    }
}

pub type SecretsResult<T> = Result<T, SecretsError>;

#[derive(Debug, Clone)]
pub struct CredentialStore {
    service: String,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE_NAME.into(),
        }
    }

    fn password_key(username: &str) -> String {
        format!("{}/password", username.trim().to_ascii_lowercase())
    }

    fn entry(&self, username: &str) -> SecretsResult<(keyring::Entry, String)> {
        let key = Self::password_key(username);
        let entry = keyring::Entry::new(&self.service, &key)?;
        Ok((entry, key))
    }

    pub fn store_password(&self, username: &str, password: &str) -> SecretsResult<()> {
        let (entry, _) = self.entry(username)?;
        entry.set_password(password)?;
        tracing::debug!(username, "stored password in keyring");
        Ok(())
    }

    /// Returns `SecretsError::NotFound` when no password is stored.
    pub fn password(&self, username: &str) -> SecretsResult<String> {
        let (entry, key) = self.entry(username)?;
        match entry.get_password() {
            Ok(secret) => Ok(secret),
            Err(keyring::Error::NoEntry) => Err(SecretsError::NotFound { key }),
            Err(e) => Err(e.into()),
        }
    }

    /// Succeeds when nothing was stored.
    pub fn delete_password(&self, username: &str) -> SecretsResult<()> {
        let (entry, _) = self.entry(username)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
