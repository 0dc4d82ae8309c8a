//! Arena-backed connection tree model.
//!
//! The model owns every node of the forest: the permanent root with the
//! user's tree and any external-session roots. Structural mutations return the
//! [`CollectionChange`] they caused; [`ModelHandle`](super::ModelHandle) is the
//! public entry point that forwards those changes to subscribers.

use std::collections::{HashMap, HashSet};

use crate::error::{ModelError, ModelResult};
use crate::models::{
    ConnectionSettings, Inheritance, NodeId, NodeKind, NodeRole, TreeNode, DEFAULT_ROOT_NAME,
};

use super::event::{CollectionChange, NodeProperty, PropertyChange};

/// Where a node goes when inserted or moved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Append as last child of the container
    Append(NodeId),
    /// Insert into the container at the index (clamped to the child count)
    At(NodeId, usize),
    /// Insert immediately before the sibling
    Before(NodeId),
    /// Insert immediately after the sibling
    After(NodeId),
}

/// Sort direction for [`ModelHandle::sort_children`](super::ModelHandle::sort_children)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// A to Z
    #[default]
    Ascending,
    /// Z to A
    Descending,
}

/// A single property assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyUpdate {
    /// New display name
    Name(String),
    /// New description
    Description(String),
    /// New open connection count
    OpenConnections(u32),
    /// New expanded flag
    Expanded(bool),
    /// New connection settings
    Settings(ConnectionSettings),
    /// New inheritance flags
    Inheritance(Inheritance),
}

impl PropertyUpdate {
    /// The property this update assigns
    #[must_use]
    pub const fn property(&self) -> NodeProperty {
        match self {
            Self::Name(_) => NodeProperty::Name,
            Self::Description(_) => NodeProperty::Description,
            Self::OpenConnections(_) => NodeProperty::OpenConnections,
            Self::Expanded(_) => NodeProperty::IsExpanded,
            Self::Settings(_) => NodeProperty::Settings,
            Self::Inheritance(_) => NodeProperty::Inheritance,
        }
    }
}

/// A copy of a subtree with fresh identities, not yet part of any model
///
/// The first node is the top of the subtree; its `parent` is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetachedSubtree {
    nodes: Vec<TreeNode>,
}

impl DetachedSubtree {
    /// Identity of the top node
    #[must_use]
    pub fn top_id(&self) -> NodeId {
        self.nodes[0].id
    }

    /// All nodes, top first
    #[must_use]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    /// Number of nodes in the subtree
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the subtree holds no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// The hierarchical connection model
#[derive(Debug, Clone)]
pub struct ConnectionTreeModel {
    nodes: HashMap<NodeId, TreeNode>,
    roots: Vec<NodeId>,
    root_id: NodeId,
}

impl Default for ConnectionTreeModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTreeModel {
    /// Creates a model holding only an empty permanent root
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(TreeNode::permanent_root(DEFAULT_ROOT_NAME))
    }

    /// Creates a model around the given node, which becomes the permanent root
    #[must_use]
    pub fn with_root(mut root: TreeNode) -> Self {
        root.kind = NodeKind::Container;
        root.role = NodeRole::PermanentRoot;
        root.parent = None;
        root.children.clear();
        let root_id = root.id;
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            roots: vec![root_id],
            root_id,
        }
    }

    // ========== Queries ==========

    /// Identity of the permanent root
    #[must_use]
    pub const fn root_id(&self) -> NodeId {
        self.root_id
    }

    /// Root nodes in display order, permanent root first
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Looks up a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Returns true if the node is registered
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Number of registered nodes, roots included
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; the permanent root is always present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Children of a node; empty for connections and unknown ids
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |n| n.children.as_slice())
    }

    /// Parent of a node
    #[must_use]
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Returns true if `ancestor` is a strict ancestor of `node`
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent_of(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// All descendants of a node in pre-order, the node itself excluded
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        result
    }

    /// Every node of the forest in pre-order, roots in display order
    #[must_use]
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut result = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            result.push(*root);
            result.extend(self.descendants(*root));
        }
        result
    }

    /// Root containers owned by the external session discovery
    #[must_use]
    pub fn external_roots(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .copied()
            .filter(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|n| n.role == NodeRole::ExternalRoot)
            })
            .collect()
    }

    /// First node in pre-order whose name matches exactly
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.depth_first()
            .into_iter()
            .find(|id| self.nodes.get(id).is_some_and(|n| n.name == name))
    }

    /// Settings of a node with inherited fields resolved through its parents
    #[must_use]
    pub fn effective_settings(&self, id: NodeId) -> Option<ConnectionSettings> {
        let node = self.nodes.get(&id)?;
        let mut settings = node.settings.clone();
        let inherit = node.inheritance;
        if inherit.any() {
            if let Some(parent) = node.parent.and_then(|p| self.effective_settings(p)) {
                if inherit.protocol {
                    settings.protocol = parent.protocol;
                }
                if inherit.port {
                    settings.port = parent.port;
                }
                if inherit.username {
                    settings.username = parent.username;
                }
                if inherit.domain {
                    settings.domain = parent.domain;
                }
            }
        }
        Some(settings)
    }

    /// Resolves a placement to a container and an insertion index
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced node is unknown, the target is not a
    /// container, or a sibling placement refers to a root.
    pub fn resolve_placement(&self, placement: Placement) -> ModelResult<(NodeId, usize)> {
        match placement {
            Placement::Append(parent) => {
                let container = self.container(parent)?;
                Ok((parent, container.children.len()))
            }
            Placement::At(parent, index) => {
                let container = self.container(parent)?;
                Ok((parent, index.min(container.children.len())))
            }
            Placement::Before(sibling) | Placement::After(sibling) => {
                let node = self.get(sibling)?;
                let parent = node.parent.ok_or(ModelError::NoParent(sibling))?;
                let index = self
                    .children(parent)
                    .iter()
                    .position(|c| *c == sibling)
                    .ok_or(ModelError::NodeNotFound(sibling))?;
                let offset = usize::from(matches!(placement, Placement::After(_)));
                Ok((parent, index + offset))
            }
        }
    }

    /// Copies a subtree with fresh identities
    ///
    /// Open connection counts are reset on the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn clone_subtree(&self, id: NodeId) -> ModelResult<DetachedSubtree> {
        self.get(id)?;
        let mut order = vec![id];
        order.extend(self.descendants(id));

        let mapping: HashMap<NodeId, NodeId> =
            order.iter().map(|old| (*old, uuid::Uuid::new_v4())).collect();

        let nodes = order
            .iter()
            .filter_map(|old| self.nodes.get(old))
            .map(|source| {
                let mut copy = source.clone();
                copy.id = mapping[&source.id];
                copy.parent = if source.id == id {
                    None
                } else {
                    source.parent.and_then(|p| mapping.get(&p).copied())
                };
                copy.children = source.children.iter().map(|c| mapping[c]).collect();
                copy.open_connections = 0;
                copy.touch();
                copy
            })
            .collect();

        Ok(DetachedSubtree { nodes })
    }

    // ========== Mutations ==========

    /// Registers an external-session root container after the existing roots
    pub(crate) fn add_root(&mut self, mut node: TreeNode) -> ModelResult<NodeId> {
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        node.kind = NodeKind::Container;
        node.role = NodeRole::ExternalRoot;
        node.parent = None;
        node.children.clear();
        let id = node.id;
        self.nodes.insert(id, node);
        self.roots.push(id);
        Ok(id)
    }

    /// Inserts a detached node; any children listed on it are dropped
    pub(crate) fn insert(
        &mut self,
        mut node: TreeNode,
        placement: Placement,
    ) -> ModelResult<CollectionChange> {
        Self::check_insertable(&node)?;
        if self.nodes.contains_key(&node.id) {
            return Err(ModelError::DuplicateId(node.id));
        }
        let (parent, index) = self.resolve_placement(placement)?;
        node.children.clear();
        node.parent = Some(parent);
        let id = node.id;
        self.nodes.insert(id, node);
        Ok(self.link(parent, index, id))
    }

    /// Inserts a detached subtree as one Add of its top node
    pub(crate) fn insert_subtree(
        &mut self,
        subtree: DetachedSubtree,
        placement: Placement,
    ) -> ModelResult<CollectionChange> {
        let mut seen = HashSet::new();
        for node in &subtree.nodes {
            Self::check_insertable(node)?;
            if self.nodes.contains_key(&node.id) || !seen.insert(node.id) {
                return Err(ModelError::DuplicateId(node.id));
            }
        }
        let (parent, index) = self.resolve_placement(placement)?;
        let top = subtree.top_id();
        for mut node in subtree.nodes {
            if node.id == top {
                node.parent = Some(parent);
            }
            self.nodes.insert(node.id, node);
        }
        Ok(self.link(parent, index, top))
    }

    /// Removes a node and its whole subtree
    pub(crate) fn remove(&mut self, id: NodeId) -> ModelResult<CollectionChange> {
        let parent = self.get(id)?.parent.ok_or(ModelError::NoParent(id))?;
        for descendant in self.descendants(id) {
            self.nodes.remove(&descendant);
        }
        self.nodes.remove(&id);
        let children_after = {
            let container = self.container_mut(parent)?;
            container.children.retain(|c| *c != id);
            container.touch();
            container.children.clone()
        };
        Ok(CollectionChange::removed(parent, vec![id], children_after))
    }

    /// Moves a node to a new position, possibly under another container
    pub(crate) fn move_node(
        &mut self,
        id: NodeId,
        placement: Placement,
    ) -> ModelResult<CollectionChange> {
        let old_parent = self.get(id)?.parent.ok_or(ModelError::NoParent(id))?;
        if let Placement::Before(sibling) | Placement::After(sibling) = placement {
            if sibling == id {
                return Err(ModelError::WouldCreateCycle {
                    node: id,
                    target: id,
                });
            }
        }
        let (target, _) = self.resolve_placement(placement)?;
        if target == id || self.is_ancestor(id, target) {
            return Err(ModelError::WouldCreateCycle { node: id, target });
        }

        self.container_mut(old_parent)?
            .children
            .retain(|c| *c != id);
        let (target, index) = self.resolve_placement(placement)?;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = Some(target);
            node.touch();
        }
        let container = self.container_mut(target)?;
        container.children.insert(index, id);
        container.touch();
        Ok(CollectionChange::moved(target, vec![id], container.children.clone()))
    }

    /// Sorts a container's children by name, case-insensitively
    pub(crate) fn sort_children(
        &mut self,
        id: NodeId,
        order: SortOrder,
    ) -> ModelResult<CollectionChange> {
        let mut children = self.container(id)?.children.clone();
        children.sort_by_cached_key(|c| {
            self.nodes
                .get(c)
                .map(|n| n.name.to_lowercase())
                .unwrap_or_default()
        });
        if order == SortOrder::Descending {
            children.reverse();
        }
        let container = self.container_mut(id)?;
        container.children.clone_from(&children);
        container.touch();
        Ok(CollectionChange::reset(id, children))
    }

    /// Applies a property update; returns `None` when the value is unchanged
    pub(crate) fn update(
        &mut self,
        id: NodeId,
        update: PropertyUpdate,
    ) -> ModelResult<Option<PropertyChange>> {
        let property = update.property();
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ModelError::NodeNotFound(id))?;
        let changed = match update {
            PropertyUpdate::Name(v) => replace_if_changed(&mut node.name, v),
            PropertyUpdate::Description(v) => replace_if_changed(&mut node.description, v),
            PropertyUpdate::OpenConnections(v) => {
                replace_if_changed(&mut node.open_connections, v)
            }
            PropertyUpdate::Expanded(v) => replace_if_changed(&mut node.expanded, v),
            PropertyUpdate::Settings(v) => replace_if_changed(&mut node.settings, v),
            PropertyUpdate::Inheritance(v) => replace_if_changed(&mut node.inheritance, v),
        };
        if !changed {
            return Ok(None);
        }
        node.touch();
        Ok(Some(PropertyChange {
            sender: id,
            property,
        }))
    }

    // ========== Internals ==========

    fn get(&self, id: NodeId) -> ModelResult<&TreeNode> {
        self.nodes.get(&id).ok_or(ModelError::NodeNotFound(id))
    }

    fn container(&self, id: NodeId) -> ModelResult<&TreeNode> {
        let node = self.get(id)?;
        if node.is_container() {
            Ok(node)
        } else {
            Err(ModelError::NotAContainer(id))
        }
    }

    fn container_mut(&mut self, id: NodeId) -> ModelResult<&mut TreeNode> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(ModelError::NodeNotFound(id))?;
        if node.is_container() {
            Ok(node)
        } else {
            Err(ModelError::NotAContainer(id))
        }
    }

    fn check_insertable(node: &TreeNode) -> ModelResult<()> {
        match node.role {
            NodeRole::PermanentRoot | NodeRole::ExternalRoot => {
                Err(ModelError::ProtectedNode(node.id))
            }
            NodeRole::Regular | NodeRole::ExternalSession => Ok(()),
        }
    }

    /// Links an already registered node into a resolved position
    fn link(&mut self, parent: NodeId, index: usize, id: NodeId) -> CollectionChange {
        let children_after = match self.nodes.get_mut(&parent) {
            Some(container) => {
                container.children.insert(index, id);
                container.touch();
                container.children.clone()
            }
            None => Vec::new(),
        };
        CollectionChange::added(parent, vec![id], children_after)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}
