//! Tree control settings
//!
//! This module defines the settings stored in config.toml.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::models::{NodeDefaults, DEFAULT_ROOT_NAME};

/// Settings of the connection tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSettings {
    /// Tree behavior
    #[serde(default)]
    pub tree: TreeBehavior,
    /// Defaults applied to new nodes
    #[serde(default)]
    pub defaults: NodeDefaults,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TreeSettings {
    /// Checks the settings for values the tree cannot work with
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.tree.root_name.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "tree.root_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.defaults.connection.port == 0 {
            return Err(ConfigError::Validation {
                field: "defaults.connection.port".to_string(),
                reason: "must be between 1 and 65535".to_string(),
            });
        }
        Ok(())
    }
}

/// Behavior of the tree control
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeBehavior {
    /// Display name of the permanent root of a new tree
    #[serde(default = "default_root_name")]
    pub root_name: String,
    /// Also save when an inline rename is committed
    #[serde(default)]
    pub save_on_rename_commit: bool,
}

fn default_root_name() -> String {
    DEFAULT_ROOT_NAME.to_string()
}

impl Default for TreeBehavior {
    fn default() -> Self {
        Self {
            root_name: default_root_name(),
            save_on_rename_commit: false,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}
