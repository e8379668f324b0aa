use std::sync::Mutex;

use super::{CredentialError, CredentialStore, StoredCredential};

/// Credential kept for the lifetime of the process only.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credential: Mutex<Option<StoredCredential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, CredentialError> {
        let credential = self.credential.lock().map_err(|_| CredentialError::Poisoned)?;
        Ok(credential.clone())
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), CredentialError> {
        let mut slot = self.credential.lock().map_err(|_| CredentialError::Poisoned)?;
        *slot = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut slot = self.credential.lock().map_err(|_| CredentialError::Poisoned)?;
        *slot = None;
        Ok(())
    }
}
