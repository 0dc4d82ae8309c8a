//! Serializable form of the user's tree.
//!
//! Only the permanent root and its descendants are persisted; external
//! session roots are rediscovered on every start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::models::{ConnectionSettings, Inheritance, NodeId, NodeKind, TreeNode};

use super::model::{ConnectionTreeModel, Placement};

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

const fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Persisted tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// Format version
    #[serde(default = "default_version")]
    pub version: u32,
    /// The permanent root with all descendants
    pub root: NodeRecord,
}

/// Persisted node with its children nested inline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Unique identifier
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Description text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Connection or container
    #[serde(default)]
    pub kind: NodeKind,
    /// Expanded flag
    #[serde(default)]
    pub expanded: bool,
    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    /// Connection settings
    #[serde(default)]
    pub settings: ConnectionSettings,
    /// Inheritance flags
    #[serde(default)]
    pub inheritance: Inheritance,
    /// Children in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    fn from_node(model: &ConnectionTreeModel, node: &TreeNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            description: node.description.clone(),
            kind: node.kind,
            expanded: node.expanded,
            created_at: node.created_at,
            updated_at: node.updated_at,
            settings: node.settings.clone(),
            inheritance: node.inheritance,
            children: node
                .children
                .iter()
                .filter_map(|c| model.node(*c))
                .map(|child| Self::from_node(model, child))
                .collect(),
        }
    }

    fn to_node(&self) -> TreeNode {
        let mut node = match self.kind {
            NodeKind::Connection => TreeNode::connection(self.name.clone()),
            NodeKind::Container => TreeNode::container(self.name.clone()),
        }
        .with_id(self.id)
        .with_description(self.description.clone())
        .with_settings(self.settings.clone());
        node.expanded = self.expanded;
        node.inheritance = self.inheritance;
        node.created_at = self.created_at;
        node.updated_at = self.updated_at;
        node
    }
}

impl ConnectionTreeModel {
    /// Captures the permanent root subtree
    #[must_use]
    pub fn snapshot(&self) -> TreeSnapshot {
        let root = self
            .node(self.root_id())
            .map(|root| NodeRecord::from_node(self, root))
            .unwrap_or_else(|| NodeRecord::from_node(self, &TreeNode::permanent_root("")));
        TreeSnapshot {
            version: SNAPSHOT_VERSION,
            root,
        }
    }

    /// Rebuilds a model from a snapshot
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a container, a connection has
    /// children, or an identity appears twice.
    pub fn from_snapshot(snapshot: &TreeSnapshot) -> ModelResult<Self> {
        if snapshot.root.kind != NodeKind::Container {
            return Err(ModelError::InvalidSnapshot(
                "root node must be a container".to_string(),
            ));
        }
        let mut model = Self::with_root(snapshot.root.to_node());
        let root_id = model.root_id();
        for child in &snapshot.root.children {
            model.restore(child, root_id)?;
        }
        Ok(model)
    }

    fn restore(&mut self, record: &NodeRecord, parent: NodeId) -> ModelResult<()> {
        if record.kind == NodeKind::Connection && !record.children.is_empty() {
            return Err(ModelError::InvalidSnapshot(format!(
                "connection '{}' has children",
                record.name
            )));
        }
        self.insert(record.to_node(), Placement::Append(parent))?;
        for child in &record.children {
            self.restore(child, record.id)?;
        }
        Ok(())
    }
}
