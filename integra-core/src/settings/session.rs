use serde::Deserialize;
use std::path::PathBuf;

use super::scheduler_interval::SchedulerInterval;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialStoreKind {
    #[serde(rename = "memory")]
    #[default]
    Memory,
    #[serde(rename = "file")]
    File,
}

#[derive(Debug, Deserialize, Clone)]
#[readonly::make]
pub struct SessionSettings {
    /// How often the stored credential is re-verified to catch revocation
    #[serde(default = "default_recheck_interval")]
    pub recheck_interval: SchedulerInterval,
    #[serde(default)]
    pub credential_store: CredentialStoreKind,
    /// Directory for the credential file, defaults to `~/.config/integra`
    pub credential_dir: Option<PathBuf>,
}

fn default_recheck_interval() -> SchedulerInterval {
    SchedulerInterval::Minutes(5)
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            recheck_interval: default_recheck_interval(),
            credential_store: CredentialStoreKind::default(),
            credential_dir: None,
        }
    }
}

impl SessionSettings {
    pub fn with_recheck_interval(interval: SchedulerInterval) -> Self {
        Self {
            recheck_interval: interval,
            ..Self::default()
        }
    }

    pub fn with_file_store(directory: PathBuf) -> Self {
        Self {
            credential_store: CredentialStoreKind::File,
            credential_dir: Some(directory),
            ..Self::default()
        }
    }
}
