use crate::error::AppError;
use config::{Config as Cfg, ConfigBuilder, File, builder::DefaultState};
use serde::Deserialize;

/// Settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint. Spans are only exported when this is set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// The standard source stack: an optional `configuration` file in the working
/// directory, overridden by `APP__`-prefixed environment variables.
///
/// Service crates add their own sources on top and deserialize into their own
/// config type, flattening [`Config`] into it.
pub fn layered() -> ConfigBuilder<DefaultState> {
    dotenvy::dotenv().ok();

    Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .separator("__")
                .try_parsing(true),
        )
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        let config = layered().build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = Cfg::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config: Config = Cfg::builder()
            .add_source(File::from_str(
                "port = 9100\nlog_level = \"debug\"\notlp_endpoint = \"http://tempo:4317\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://tempo:4317"));
    }
}
