//! Default templates applied to newly created nodes.

use serde::{Deserialize, Serialize};

use super::node::TreeNode;
use super::settings::{ConnectionSettings, Inheritance};

/// Source of the default settings and default inheritance of new nodes
pub trait DefaultTemplates {
    /// Copies the default connection settings onto a new node
    fn apply_defaults(&self, node: &mut TreeNode);

    /// Copies the default inheritance flags onto a new node
    fn apply_default_inheritance(&self, inheritance: &mut Inheritance);
}

/// Default settings and inheritance read from the settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefaults {
    /// Settings copied to every new node
    #[serde(default)]
    pub connection: ConnectionSettings,
    /// Inheritance flags copied to every new node
    #[serde(default)]
    pub inheritance: Inheritance,
}

impl DefaultTemplates for NodeDefaults {
    fn apply_defaults(&self, node: &mut TreeNode) {
        node.settings = self.connection.clone();
    }

    fn apply_default_inheritance(&self, inheritance: &mut Inheritance) {
        *inheritance = self.inheritance;
    }
}
