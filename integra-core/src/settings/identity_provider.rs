use serde::Deserialize;

/// Which identity provider backs the session store.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// Seeded in-memory directory, for local development and demos
    #[serde(rename = "memory")]
    #[default]
    InMemory,
    #[serde(rename = "http")]
    Http,
}

#[derive(Debug, Deserialize, Clone)]
#[readonly::make]
pub struct IdentityProviderSettings {
    #[serde(default)]
    pub mode: ProviderMode,
    /// Base URL of the HTTP identity provider
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_attempts() -> usize {
    3
}

impl Default for IdentityProviderSettings {
    fn default() -> Self {
        Self {
            mode: ProviderMode::default(),
            base_url: None,
            timeout_seconds: default_timeout_seconds(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl IdentityProviderSettings {
    pub fn http(base_url: &str) -> Self {
        Self {
            mode: ProviderMode::Http,
            base_url: Some(base_url.trim_end_matches('/').to_string()),
            ..Self::default()
        }
    }
}
