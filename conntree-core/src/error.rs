//! Error types for `ConnTree`
//!
//! This module defines the error types used by the tree model, the view
//! binding and the configuration layer.

use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Top-level error type for `ConnTree` operations
#[derive(Debug, Error)]
pub enum TreeError {
    /// Structural model errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A model was attached while post-attach actions were still running
    #[error("Cannot attach a model from within a post-attach action")]
    ReentrantAttach,

    /// An operation needed a bound model but none is attached
    #[error("No model is attached to the tree")]
    Unbound,

    /// A selection listener rejected the new selection
    #[error("Selection listener failed: {0}")]
    Selection(String),
}

/// Errors raised by structural mutations of the connection tree model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The referenced node is not registered in the model
    #[error("Node not found: {0}")]
    NodeNotFound(Uuid),

    /// The operation needs a container but the node is a connection
    #[error("Node {0} is not a container")]
    NotAContainer(Uuid),

    /// The node has no parent (it is a root)
    #[error("Node {0} has no parent")]
    NoParent(Uuid),

    /// The node is a protected root variant
    #[error("Node {0} is protected")]
    ProtectedNode(Uuid),

    /// Moving the node would place it under itself
    #[error("Moving node {node} under {target} would create a cycle")]
    WouldCreateCycle {
        /// The node being moved
        node: Uuid,
        /// The requested new parent
        target: Uuid,
    },

    /// A node with this identity is already registered
    #[error("Duplicate node id: {0}")]
    DuplicateId(Uuid),

    /// A persisted snapshot could not be turned into a model
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Errors related to configuration file operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// The reason for validation failure
        reason: String,
    },

    /// Configuration directory could not be determined
    #[error("Configuration directory not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Failed to deserialize configuration
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),
}

/// Result type alias for `ConnTree` operations
pub type TreeResult<T> = std::result::Result<T, TreeError>;

/// Result type alias for model operations
pub type ModelResult<T> = std::result::Result<T, ModelError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
