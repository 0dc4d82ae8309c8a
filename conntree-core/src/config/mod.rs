//! Configuration management for `ConnTree`
//!
//! This module provides the `ConfigManager` for loading and saving the
//! settings file and the persisted tree.

mod manager;
mod settings;

pub use manager::ConfigManager;
pub use settings::{LoggingSettings, TreeBehavior, TreeSettings};
