use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::pr::ChangelogOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration loaded from .pr-changelog.toml.
///
/// All fields are optional; the tool works with zero config.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Changelog presentation settings
    #[serde(default)]
    pub changelog: ChangelogConfig,

    /// GitHub label name -> changelog category name
    #[serde(default)]
    pub categories: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangelogConfig {
    /// Credit the PR author on each entry
    #[serde(default)]
    pub include_author: bool,

    /// Link each entry back to its PR
    #[serde(default)]
    pub include_link: bool,
}

impl Config {
    /// Load configuration from .pr-changelog.toml in the current directory.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-changelog.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Presentation flags; a `true` CLI flag switches the setting on.
    pub fn options(&self, include_author: bool, include_link: bool) -> ChangelogOptions {
        ChangelogOptions {
            include_author: include_author || self.changelog.include_author,
            include_link: include_link || self.changelog.include_link,
        }
    }
}
