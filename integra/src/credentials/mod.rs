//! Persistence of the session credential between checks and restarts

pub mod file;
pub mod memory;

use chrono::{DateTime, Utc};
use integra_core::utils::secret::MaskedSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Could not determine the config directory")]
    ConfigDirNotFound,
    #[error("Credential store lock poisoned")]
    Poisoned,
}

/// Credential issued by an identity provider after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredCredential {
    pub token: MaskedSecret,
    pub provider: String,
    pub user_email: String,
    pub issued_at: DateTime<Utc>,
}

impl StoredCredential {
    pub fn new(token: MaskedSecret, provider: &str, user_email: &str) -> Self {
        Self {
            token,
            provider: provider.to_string(),
            user_email: user_email.to_string(),
            issued_at: Utc::now(),
        }
    }
}

/// Holds at most one credential.
///
/// Implementations are synchronous so the session store can update them
/// atomically with its own state.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredCredential>, CredentialError>;
    fn save(&self, credential: &StoredCredential) -> Result<(), CredentialError>;
    /// Removing an absent credential is not an error
    fn clear(&self) -> Result<(), CredentialError>;
}
