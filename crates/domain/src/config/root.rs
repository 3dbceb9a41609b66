use serde::{Deserialize, Serialize};

use super::blocking::BlockingConfig;
use super::errors::ConfigError;
use super::hosts::HostsConfig;
use super::logging::{LoggingConfig, LOG_LEVELS};
use super::responder::ResponderConfig;

const LOCAL_CONFIG_PATH: &str = "hostblock.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/hostblock/config.toml";

/// Main configuration structure for hostblock
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Hosts file location and cache flushing
    #[serde(default)]
    pub hosts: HostsConfig,

    /// Block page listeners
    #[serde(default)]
    pub responder: ResponderConfig,

    /// Managed site list
    #[serde(default)]
    pub blocking: BlockingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. hostblock.toml in current directory
    /// 3. /etc/hostblock/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(path) = overrides.hosts_file {
            self.hosts.path = path;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "hosts.path cannot be empty".to_string(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "Unknown log level '{}' (expected one of {})",
                self.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        if self.responder.key_path.is_some() && self.responder.cert_path.is_none() {
            return Err(ConfigError::Validation(
                "responder.key_path requires responder.cert_path".to_string(),
            ));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        if std::path::Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if std::path::Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }

    /// Path new configuration is written to when no file exists yet
    pub fn default_config_path() -> &'static str {
        LOCAL_CONFIG_PATH
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub hosts_file: Option<String>,
    pub log_level: Option<String>,
}
