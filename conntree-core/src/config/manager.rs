//! Configuration manager for TOML file operations
//!
//! This module provides the `ConfigManager` which handles loading and saving
//! the tree settings and the persisted tree.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::tree::TreeSnapshot;

use super::settings::TreeSettings;

/// File names for configuration files
const CONFIG_FILE: &str = "config.toml";
const CONNECTIONS_FILE: &str = "connections.toml";

/// Configuration manager for `ConnTree`
///
/// Configuration is stored in `~/.config/conntree/` by default.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Base directory for configuration files
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a new `ConfigManager` with the default configuration directory
    ///
    /// # Errors
    ///
    /// Returns an error if the user configuration directory cannot be determined.
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config")))?
            .join("conntree");
        Ok(Self { config_dir })
    }

    /// Creates a new `ConfigManager` with a custom configuration directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory path
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Ensures the configuration directory exists
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> ConfigResult<()> {
        if !self.config_dir.exists() {
            fs::create_dir_all(&self.config_dir).map_err(|e| {
                ConfigError::Write(format!(
                    "Failed to create config directory {}: {}",
                    self.config_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    // ========== Settings ==========

    /// Loads and validates the settings; a missing file yields defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load_settings(&self) -> ConfigResult<TreeSettings> {
        let settings: TreeSettings = self.load_toml(CONFIG_FILE)?.unwrap_or_default();
        settings.validate()?;
        Ok(settings)
    }

    /// Validates and writes the settings
    ///
    /// # Errors
    ///
    /// Returns an error if validation or writing fails.
    pub fn save_settings(&self, settings: &TreeSettings) -> ConfigResult<()> {
        settings.validate()?;
        self.save_toml(CONFIG_FILE, settings)
    }

    // ========== Tree ==========

    /// Loads the persisted tree; `None` if nothing was saved yet
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_tree(&self) -> ConfigResult<Option<TreeSnapshot>> {
        self.load_toml(CONNECTIONS_FILE)
    }

    /// Writes the tree, replacing the previous file atomically
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save_tree(&self, snapshot: &TreeSnapshot) -> ConfigResult<()> {
        self.save_toml(CONNECTIONS_FILE, snapshot)
    }

    // ========== Helpers ==========

    fn load_toml<T: DeserializeOwned>(&self, file: &str) -> ConfigResult<Option<T>> {
        let path = self.config_dir.join(file);
        if !path.exists() {
            debug!(path = %path.display(), "Config file missing, using defaults");
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| {
            ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::Deserialize(format!("{}: {}", path.display(), e)))
    }

    fn save_toml<T: Serialize>(&self, file: &str, value: &T) -> ConfigResult<()> {
        self.ensure_config_dir()?;
        let content =
            toml::to_string_pretty(value).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        let path = self.config_dir.join(file);
        let temp = path.with_extension("toml.tmp");
        fs::write(&temp, content).map_err(|e| {
            ConfigError::Write(format!("Failed to write {}: {}", temp.display(), e))
        })?;
        fs::rename(&temp, &path).map_err(|e| {
            ConfigError::Write(format!("Failed to replace {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Config file written");
        Ok(())
    }
}
