use config::{Config, ConfigError, Environment, File};
use integra_core::settings::{
    identity_provider::{IdentityProviderSettings, ProviderMode},
    session::SessionSettings,
};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
#[allow(unused)]
pub struct Settings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub identity_provider: IdentityProviderSettings,
    #[serde(default)]
    pub session: SessionSettings,
}

impl Settings {
    pub fn get_environment() -> Environment {
        Environment::default()
            .prefix("INTEGRA")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    /// Layered configuration: `config/default`, `config/<run mode>`,
    /// `config/local`, then `INTEGRA__*` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("INTEGRA_RUN_MODE").unwrap_or_else(|_| "development".into());

        let settings: Settings = Config::builder()
            .set_default("identity_provider.mode", "memory")?
            .set_default("session.recheck_interval", "5m")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Self::get_environment())
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.identity_provider.mode == ProviderMode::Http
            && self
                .identity_provider
                .base_url
                .as_deref()
                .is_none_or(|url| url.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "identity_provider.base_url must be set when identity_provider.mode is http"
                    .into(),
            ));
        }
        Ok(())
    }
}
