//! Configuration management for magick-probe.
//!
//! Configuration is loaded from the platform config directory
//! (falling back to `~/.magick-probe/config.toml`) with sensible defaults.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for magick-probe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// External convert command settings
    pub convert: ConvertConfig,

    /// Parallel pipeline settings
    pub pipeline: PipelineConfig,

    /// Input file discovery settings
    pub discovery: DiscoveryConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.magick-probe.magick-probe/config.toml
    /// - Linux: ~/.config/magick-probe/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\magick-probe\config\config.toml
    ///
    /// Falls back to ~/.magick-probe/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "magick-probe", "magick-probe")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".magick-probe").join("config.toml")
            })
    }

    /// Get the convert command with `~` expanded.
    pub fn convert_command(&self) -> String {
        shellexpand::tilde(&self.convert.command).into_owned()
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}
