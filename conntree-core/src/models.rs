//! Core data models for `ConnTree`
//!
//! This module defines the tree node, its connection settings and the default
//! templates used when the user creates new nodes.

mod defaults;
mod node;
mod settings;

pub use defaults::{DefaultTemplates, NodeDefaults};
pub use node::{
    NodeId, NodeKind, NodeRole, TreeNode, DEFAULT_ROOT_NAME, NEW_CONNECTION_NAME,
    NEW_FOLDER_NAME,
};
pub use settings::{ConnectionSettings, Inheritance, ProtocolType};
