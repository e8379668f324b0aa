use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{CredentialError, CredentialStore, StoredCredential};

const CREDENTIAL_FILE: &str = "credentials.json";

/// On-disk layout: one credential per identity provider.
#[derive(serde::Serialize, serde::Deserialize, Default, Debug)]
struct CredentialFile {
    credentials: HashMap<String, StoredCredential>,
}

/// Credential persisted to `<dir>/credentials.json` with owner-only
/// permissions, keyed by the identity provider it was issued by.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    config_dir: PathBuf,
    provider_key: String,
}

impl FileCredentialStore {
    pub fn new(config_dir: impl Into<PathBuf>, provider: &str) -> Self {
        Self {
            config_dir: config_dir.into(),
            provider_key: normalize_provider_key(provider),
        }
    }

    /// Store below `~/.config/integra`
    pub fn in_default_dir(provider: &str) -> Result<Self, CredentialError> {
        Ok(Self::new(default_config_dir()?, provider))
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CREDENTIAL_FILE)
    }

    fn read_file(&self) -> Result<CredentialFile, CredentialError> {
        let path = self.path();
        if !path.exists() {
            debug!("Credential file {:?} does not exist", path);
            return Ok(CredentialFile::default());
        }
        let json = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write_file(&self, file: &CredentialFile) -> Result<(), CredentialError> {
        fs::create_dir_all(&self.config_dir)?;
        let path = self.path();
        fs::write(&path, serde_json::to_string_pretty(file)?)?;
        restrict_permissions(&path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, CredentialError> {
        let mut file = self.read_file()?;
        Ok(file.credentials.remove(&self.provider_key))
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), CredentialError> {
        let mut file = self.read_file()?;
        file.credentials
            .insert(self.provider_key.clone(), credential.clone());
        self.write_file(&file)?;
        debug!(
            "Stored credential of {} for {}",
            credential.user_email, self.provider_key
        );
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        let mut file = self.read_file()?;
        if file.credentials.remove(&self.provider_key).is_none() {
            return Ok(());
        }
        if file.credentials.is_empty() {
            fs::remove_file(self.path())?;
        } else {
            self.write_file(&file)?;
        }
        debug!("Removed credential for {}", self.provider_key);
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<(), CredentialError> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o600);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<(), CredentialError> {
    Ok(())
}

fn default_config_dir() -> Result<PathBuf, CredentialError> {
    let home_dir = std::env::var("HOME").map_err(|_| CredentialError::ConfigDirNotFound)?;
    Ok(PathBuf::from(home_dir).join(".config").join("integra"))
}

fn normalize_provider_key(provider: &str) -> String {
    provider.trim().trim_end_matches('/').to_lowercase()
}
