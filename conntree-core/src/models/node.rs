//! Tree node model: connections, folders and the protected root variants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::settings::{ConnectionSettings, Inheritance};

/// Identity of a node in the tree
pub type NodeId = Uuid;

/// Default display name of the permanent root
pub const DEFAULT_ROOT_NAME: &str = "Connections";

/// Default display name of a newly added connection
pub const NEW_CONNECTION_NAME: &str = "New Connection";

/// Default display name of a newly added folder
pub const NEW_FOLDER_NAME: &str = "New Folder";

/// Structural kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A leaf connection entry
    #[default]
    Connection,
    /// A folder that owns an ordered list of children
    Container,
}

/// Role of a node, which decides what the user may do with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// An ordinary user-managed node
    #[default]
    Regular,
    /// The single permanent root of the user's tree
    PermanentRoot,
    /// A root container owned by the external session discovery
    ExternalRoot,
    /// A session node discovered by the external session discovery
    ExternalSession,
}

impl NodeRole {
    /// Protected nodes can be neither deleted nor dragged
    #[must_use]
    pub const fn is_protected(self) -> bool {
        !matches!(self, Self::Regular)
    }

    /// Returns true for nodes owned by the external session discovery
    #[must_use]
    pub const fn is_external(self) -> bool {
        matches!(self, Self::ExternalRoot | Self::ExternalSession)
    }

    /// Returns true if the user may drop or add nodes into this node
    #[must_use]
    pub const fn accepts_user_children(self) -> bool {
        !self.is_external()
    }
}

/// A node of the connection tree
///
/// Nodes live in the [`ConnectionTreeModel`](crate::tree::ConnectionTreeModel)
/// arena. `parent` is a back-reference only; the parent's `children` list is
/// the authoritative membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Unique identifier
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Free-text description, shown as tooltip
    pub description: String,
    /// Connection or container
    pub kind: NodeKind,
    /// Protection role
    pub role: NodeRole,
    /// Parent container (None for roots and detached nodes)
    pub parent: Option<NodeId>,
    /// Ordered children, always empty for connections
    pub children: Vec<NodeId>,
    /// Whether the container is expanded in the view
    pub expanded: bool,
    /// Number of open sessions for this connection
    pub open_connections: u32,
    /// Connection target settings
    pub settings: ConnectionSettings,
    /// Which settings are inherited from the parent
    pub inheritance: Inheritance,
    /// Timestamp when the node was created
    pub created_at: DateTime<Utc>,
    /// Timestamp when the node was last modified
    pub updated_at: DateTime<Utc>,
}

impl TreeNode {
    fn new(name: impl Into<String>, kind: NodeKind, role: NodeRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            kind,
            role,
            parent: None,
            children: Vec::new(),
            expanded: false,
            open_connections: 0,
            settings: ConnectionSettings::default(),
            inheritance: Inheritance::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a detached connection node
    #[must_use]
    pub fn connection(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Connection, NodeRole::Regular)
    }

    /// Creates a detached folder node
    #[must_use]
    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Container, NodeRole::Regular)
    }

    /// Creates the permanent root container
    #[must_use]
    pub fn permanent_root(name: impl Into<String>) -> Self {
        let mut root = Self::new(name, NodeKind::Container, NodeRole::PermanentRoot);
        root.expanded = true;
        root
    }

    /// Creates a root container for externally discovered sessions
    #[must_use]
    pub fn external_root(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Container, NodeRole::ExternalRoot)
    }

    /// Creates an externally discovered session node
    #[must_use]
    pub fn external_session(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Connection, NodeRole::ExternalSession)
    }

    /// Sets the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the connection settings
    #[must_use]
    pub fn with_settings(mut self, settings: ConnectionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the identifier, used when restoring persisted nodes
    #[must_use]
    pub const fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    /// Returns true if this node can own children
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Container)
    }

    /// Returns true for the permanent root and external-session variants
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        self.role.is_protected()
    }

    /// Updates the `updated_at` timestamp to now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
