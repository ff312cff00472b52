//! Default provider lookup, used when no policy names a provider.

use crate::config::DefaultProvidersConfig;
use crate::models::{Channel, ProviderName};
use async_trait::async_trait;
use std::collections::HashMap;

#[async_trait]
pub trait DefaultProviderRegistry: Send + Sync {
    /// The configured default for `channel`, or `None` if there is none.
    async fn default_provider(&self, channel: Channel) -> Option<ProviderName>;
}

/// Defaults taken from configuration. Blank names count as unset.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredDefaultProviders {
    defaults: HashMap<Channel, ProviderName>,
}

impl ConfiguredDefaultProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, channel: Channel, provider: impl Into<String>) -> Self {
        let provider = provider.into();
        let provider = provider.trim();
        if provider.is_empty() {
            self.defaults.remove(&channel);
        } else {
            self.defaults.insert(channel, ProviderName::new(provider));
        }
        self
    }

    pub fn from_config(config: &DefaultProvidersConfig) -> Self {
        Channel::ALL
            .into_iter()
            .fold(Self::new(), |registry, channel| match config.get(channel) {
                Some(name) => registry.with(channel, name),
                None => registry,
            })
    }

    pub fn configured_channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| self.defaults.contains_key(channel))
            .collect()
    }
}

#[async_trait]
impl DefaultProviderRegistry for ConfiguredDefaultProviders {
    async fn default_provider(&self, channel: Channel) -> Option<ProviderName> {
        self.defaults.get(&channel).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_default_per_channel() {
        let registry = ConfiguredDefaultProviders::new()
            .with(Channel::Sms, "default")
            .with(Channel::Email, " smtp-main ");

        assert_eq!(
            registry.default_provider(Channel::Sms).await,
            Some(ProviderName::from("default"))
        );
        assert_eq!(
            registry.default_provider(Channel::Email).await,
            Some(ProviderName::from("smtp-main"))
        );
        assert_eq!(registry.default_provider(Channel::Push).await, None);
    }

    #[tokio::test]
    async fn blank_names_are_not_configured() {
        let config = DefaultProvidersConfig {
            sms: Some("   ".to_string()),
            push: Some("fcm".to_string()),
            ..Default::default()
        };
        let registry = ConfiguredDefaultProviders::from_config(&config);

        assert_eq!(registry.default_provider(Channel::Sms).await, None);
        assert_eq!(registry.configured_channels(), vec![Channel::Push]);
    }
}
