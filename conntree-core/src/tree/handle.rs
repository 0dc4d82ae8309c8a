//! Shared, observable handle around the connection tree model.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::debug;

use crate::error::ModelResult;
use crate::models::{NodeId, TreeNode};
use crate::subscription::{Subscribers, SubscriptionToken};

use super::event::{CollectionChange, PropertyChange};
use super::model::{ConnectionTreeModel, DetachedSubtree, Placement, PropertyUpdate, SortOrder};

struct Shared {
    model: RefCell<ConnectionTreeModel>,
    collection: Subscribers<CollectionChange>,
    property: Subscribers<PropertyChange>,
}

/// Cloneable handle to an observable model
///
/// Every mutation releases the model borrow before notifying subscribers, so
/// handlers are free to read the model.
#[derive(Clone)]
pub struct ModelHandle {
    shared: Rc<Shared>,
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("nodes", &self.shared.model.borrow().len())
            .field("collection_subscribers", &self.shared.collection.len())
            .field("property_subscribers", &self.shared.property.len())
            .finish()
    }
}

impl Default for ModelHandle {
    fn default() -> Self {
        Self::new(ConnectionTreeModel::new())
    }
}

impl ModelHandle {
    /// Wraps a model
    #[must_use]
    pub fn new(model: ConnectionTreeModel) -> Self {
        Self {
            shared: Rc::new(Shared {
                model: RefCell::new(model),
                collection: Subscribers::new(),
                property: Subscribers::new(),
            }),
        }
    }

    /// Borrows the model for reading
    ///
    /// # Panics
    ///
    /// Panics if called from inside a mutation, which never happens for
    /// subscribers since they run after the borrow is released.
    #[must_use]
    pub fn read(&self) -> Ref<'_, ConnectionTreeModel> {
        self.shared.model.borrow()
    }

    /// Returns a copy of a node
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<TreeNode> {
        self.read().node(id).cloned()
    }

    /// Returns true if both handles refer to the same model
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    // ========== Subscriptions ==========

    /// Subscribes to structural changes
    pub fn subscribe_collection(
        &self,
        handler: impl Fn(&CollectionChange) + 'static,
    ) -> SubscriptionToken {
        self.shared.collection.subscribe(handler)
    }

    /// Subscribes to property changes
    pub fn subscribe_property(
        &self,
        handler: impl Fn(&PropertyChange) + 'static,
    ) -> SubscriptionToken {
        self.shared.property.subscribe(handler)
    }

    /// Removes a subscription of either kind
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.shared.collection.unsubscribe(token) || self.shared.property.unsubscribe(token)
    }

    /// Total number of live subscriptions
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.shared.collection.len() + self.shared.property.len()
    }

    // ========== Mutations ==========

    /// Appends a node to a container
    ///
    /// # Errors
    ///
    /// Returns an error if the parent is unknown or not a container, or the
    /// node's identity is already taken.
    pub fn add_node(&self, node: TreeNode, parent: NodeId) -> ModelResult<NodeId> {
        self.insert_node(node, Placement::Append(parent))
    }

    /// Inserts a node at a placement
    ///
    /// # Errors
    ///
    /// Returns an error if the placement cannot be resolved or the node's
    /// identity is already taken.
    pub fn insert_node(&self, node: TreeNode, placement: Placement) -> ModelResult<NodeId> {
        let id = node.id;
        let change = self.shared.model.borrow_mut().insert(node, placement)?;
        self.emit_collection(&change);
        Ok(id)
    }

    /// Inserts a copied subtree immediately after `sibling`
    ///
    /// # Errors
    ///
    /// Returns an error if the sibling is unknown or a root.
    pub fn set_child_below(
        &self,
        subtree: DetachedSubtree,
        sibling: NodeId,
    ) -> ModelResult<NodeId> {
        let id = subtree.top_id();
        let change = self
            .shared
            .model
            .borrow_mut()
            .insert_subtree(subtree, Placement::After(sibling))?;
        self.emit_collection(&change);
        Ok(id)
    }

    /// Deep-copies a node and inserts the copy right after the original
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or has no parent.
    pub fn duplicate_node(&self, id: NodeId) -> ModelResult<NodeId> {
        let subtree = self.read().clone_subtree(id)?;
        self.set_child_below(subtree, id)
    }

    /// Removes a node and its subtree
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or is a root.
    pub fn delete_node(&self, id: NodeId) -> ModelResult<()> {
        let change = self.shared.model.borrow_mut().remove(id)?;
        self.emit_collection(&change);
        Ok(())
    }

    /// Moves a node; emits a single Move on the destination container
    ///
    /// # Errors
    ///
    /// Returns an error if the node is a root or the placement would place
    /// it under itself.
    pub fn move_node(&self, id: NodeId, placement: Placement) -> ModelResult<()> {
        let change = self.shared.model.borrow_mut().move_node(id, placement)?;
        self.emit_collection(&change);
        Ok(())
    }

    /// Sorts a container's children by name
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown or not a container.
    pub fn sort_children(&self, id: NodeId, order: SortOrder) -> ModelResult<()> {
        let change = self.shared.model.borrow_mut().sort_children(id, order)?;
        self.emit_collection(&change);
        Ok(())
    }

    /// Adds an external-session root container; roots have no parent so no
    /// collection change is emitted
    ///
    /// # Errors
    ///
    /// Returns an error if the identity is already taken.
    pub fn add_external_root(&self, node: TreeNode) -> ModelResult<NodeId> {
        self.shared.model.borrow_mut().add_root(node)
    }

    /// Assigns a property, notifying subscribers if the value changed
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn update(&self, id: NodeId, update: PropertyUpdate) -> ModelResult<()> {
        let change = self.shared.model.borrow_mut().update(id, update)?;
        if let Some(change) = change {
            debug!(node_id = %change.sender, property = %change.property, "Property changed");
            self.shared.property.emit(&change);
        }
        Ok(())
    }

    /// Renames a node
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn set_name(&self, id: NodeId, name: impl Into<String>) -> ModelResult<()> {
        self.update(id, PropertyUpdate::Name(name.into()))
    }

    /// Changes a node's description
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn set_description(&self, id: NodeId, description: impl Into<String>) -> ModelResult<()> {
        self.update(id, PropertyUpdate::Description(description.into()))
    }

    /// Records the number of open sessions of a connection
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn set_open_connections(&self, id: NodeId, count: u32) -> ModelResult<()> {
        self.update(id, PropertyUpdate::OpenConnections(count))
    }

    /// Stores a container's expanded flag
    ///
    /// # Errors
    ///
    /// Returns an error if the node is unknown.
    pub fn set_expanded(&self, id: NodeId, expanded: bool) -> ModelResult<()> {
        self.update(id, PropertyUpdate::Expanded(expanded))
    }

    fn emit_collection(&self, change: &CollectionChange) {
        debug!(
            action = ?change.action,
            source = ?change.source,
            items = change.old_items.len().max(change.new_items.len()),
            "Collection changed"
        );
        self.shared.collection.emit(change);
    }
}

/// The model currently bound to a tree, shared with collaborators that need
/// to follow re-attachment (the external feed bridge and the saver)
#[derive(Debug, Clone, Default)]
pub struct ModelSlot {
    current: Rc<RefCell<Option<ModelHandle>>>,
}

impl ModelSlot {
    /// Creates an empty slot
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The bound model, if any
    #[must_use]
    pub fn get(&self) -> Option<ModelHandle> {
        self.current.borrow().clone()
    }

    /// Replaces the bound model, returning the previous one
    pub fn replace(&self, model: ModelHandle) -> Option<ModelHandle> {
        self.current.borrow_mut().replace(model)
    }

    /// Returns true if a model is bound
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.current.borrow().is_some()
    }
}
