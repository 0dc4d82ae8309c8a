//! Change notifications emitted by the connection tree model.

use crate::models::NodeId;

/// Kind of structural change applied to a container's children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Items were inserted
    Add,
    /// Items were removed
    Remove,
    /// An item was replaced in place
    Replace,
    /// Items were moved, possibly from another container
    Move,
    /// The child list changed wholesale (for example after sorting)
    Reset,
}

/// A structural change to one container's child list
///
/// `children_after` is the container's child list right after the change was
/// applied, so the change can be interpreted without reading the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionChange {
    /// What happened; `None` for notifications without a recognised action
    pub action: Option<ChangeAction>,
    /// The container whose children changed
    pub source: Option<NodeId>,
    /// Items that left (Remove, Replace) or moved (Move)
    pub old_items: Vec<NodeId>,
    /// Items that arrived (Add, Replace) or moved (Move)
    pub new_items: Vec<NodeId>,
    /// Child list of `source` after the change
    pub children_after: Vec<NodeId>,
}

impl CollectionChange {
    /// Items were added to `source`
    #[must_use]
    pub fn added(source: NodeId, items: Vec<NodeId>, children_after: Vec<NodeId>) -> Self {
        Self {
            action: Some(ChangeAction::Add),
            source: Some(source),
            old_items: Vec::new(),
            new_items: items,
            children_after,
        }
    }

    /// Items were removed from `source`
    #[must_use]
    pub fn removed(source: NodeId, items: Vec<NodeId>, children_after: Vec<NodeId>) -> Self {
        Self {
            action: Some(ChangeAction::Remove),
            source: Some(source),
            old_items: items,
            new_items: Vec::new(),
            children_after,
        }
    }

    /// Items were moved into or within `source`
    #[must_use]
    pub fn moved(source: NodeId, items: Vec<NodeId>, children_after: Vec<NodeId>) -> Self {
        Self {
            action: Some(ChangeAction::Move),
            source: Some(source),
            old_items: items.clone(),
            new_items: items,
            children_after,
        }
    }

    /// The child list of `source` was rebuilt
    #[must_use]
    pub fn reset(source: NodeId, children_after: Vec<NodeId>) -> Self {
        Self {
            action: Some(ChangeAction::Reset),
            source: Some(source),
            old_items: Vec::new(),
            new_items: Vec::new(),
            children_after,
        }
    }
}

/// Node property named in a property-change notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeProperty {
    /// Display name
    Name,
    /// Description text
    Description,
    /// Open connection count
    OpenConnections,
    /// Expanded flag of a container
    IsExpanded,
    /// Connection settings
    Settings,
    /// Inheritance flags
    Inheritance,
}

impl NodeProperty {
    /// Every property, in declaration order
    pub const ALL: [Self; 6] = [
        Self::Name,
        Self::Description,
        Self::OpenConnections,
        Self::IsExpanded,
        Self::Settings,
        Self::Inheritance,
    ];

    /// Property name as reported to observers
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Description => "Description",
            Self::OpenConnections => "OpenConnections",
            Self::IsExpanded => "IsExpanded",
            Self::Settings => "Settings",
            Self::Inheritance => "Inheritance",
        }
    }
}

impl std::fmt::Display for NodeProperty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single property of a node changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChange {
    /// The node whose property changed
    pub sender: NodeId,
    /// Which property changed
    pub property: NodeProperty,
}
