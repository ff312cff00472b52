use crate::models::{Channel, PolicyDescriptor};
use config::{builder::DefaultState, ConfigBuilder};
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::collections::HashSet;

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderServiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default)]
    pub default_providers: DefaultProvidersConfig,
    /// Policies served by the built-in matcher, in match order.
    #[serde(default)]
    pub policies: Vec<PolicyDescriptor>,
}

/// Default provider name per channel.
///
/// Overridable per channel, e.g. `APP__DEFAULT_PROVIDERS__SMS=gateway-a`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultProvidersConfig {
    pub sms: Option<String>,
    pub email: Option<String>,
    pub push: Option<String>,
    pub voice: Option<String>,
}

impl DefaultProvidersConfig {
    pub fn get(&self, channel: Channel) -> Option<&str> {
        match channel {
            Channel::Sms => self.sms.as_deref(),
            Channel::Email => self.email.as_deref(),
            Channel::Push => self.push.as_deref(),
            Channel::Voice => self.voice.as_deref(),
        }
    }
}

impl ProviderServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_builder(core_config::layered())
    }

    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject policy sets the matcher cannot evaluate unambiguously.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut names = HashSet::new();

        for policy in &self.policies {
            let name = policy.name.trim();
            if name.is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "policy with action '{}' has no name",
                    policy.action
                )));
            }
            if policy.scope.trim().is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "policy '{}' has no scope",
                    name
                )));
            }
            if !names.insert(name) {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "policy '{}' is defined more than once",
                    name
                )));
            }
        }

        Ok(())
    }
}
