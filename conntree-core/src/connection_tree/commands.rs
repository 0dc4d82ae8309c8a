//! Node commands run against the current selection.
//!
//! None of these surface failures to the caller: expected no-ops return
//! quietly, anything else is logged.

use tracing::{debug, error, info, warn};

use crate::error::{ModelError, TreeResult};
use crate::models::{NodeId, TreeNode, NEW_CONNECTION_NAME, NEW_FOLDER_NAME};
use crate::tree::SortOrder;

use super::ConnectionTree;

impl ConnectionTree {
    /// Adds a connection next to or under the selection
    ///
    /// Returns the new node's id, or `None` if nothing is selected or the
    /// add failed.
    pub fn add_connection(&self) -> Option<NodeId> {
        self.add_node(TreeNode::connection(NEW_CONNECTION_NAME))
    }

    /// Adds a folder next to or under the selection
    pub fn add_folder(&self) -> Option<NodeId> {
        self.add_node(TreeNode::container(NEW_FOLDER_NAME))
    }

    fn add_node(&self, node: TreeNode) -> Option<NodeId> {
        let selected = self.view.selected()?;
        match self.try_add_node(node, selected) {
            Ok(id) => Some(id),
            Err(e) => {
                error!(selected_id = %selected, error = %e, "Failed to add node");
                None
            }
        }
    }

    fn try_add_node(&self, mut node: TreeNode, selected: NodeId) -> TreeResult<NodeId> {
        let model = self.model()?;
        let parent = {
            let model = model.read();
            let selection = model
                .node(selected)
                .ok_or(ModelError::NodeNotFound(selected))?;
            let parent = if selection.is_container() {
                selection.id
            } else {
                selection.parent.ok_or(ModelError::NoParent(selected))?
            };
            let accepts = model
                .node(parent)
                .is_some_and(|p| p.role.accepts_user_children());
            if !accepts {
                return Err(ModelError::ProtectedNode(parent).into());
            }
            parent
        };

        self.defaults.apply_defaults(&mut node);
        self.defaults.apply_default_inheritance(&mut node.inheritance);
        let id = model.add_node(node, parent)?;

        self.view.expand(parent);
        self.view.select(id);
        self.view.scroll_into_view(id);
        info!(node_id = %id, parent_id = %parent, "Node added");
        Ok(id)
    }

    /// Deep-copies the selection right after the original and requests a save
    pub fn duplicate_selected(&self) -> Option<NodeId> {
        let selected = self.selected_node()?;
        if selected.is_protected() || selected.parent.is_none() {
            debug!(node_id = %selected.id, "Protected node not duplicated");
            return None;
        }
        let model = self.slot.get()?;
        match model.duplicate_node(selected.id) {
            Ok(copy) => {
                self.saver.save_async();
                Some(copy)
            }
            Err(e) => {
                warn!(node_id = %selected.id, error = %e, "Failed to duplicate node");
                None
            }
        }
    }

    /// Starts an inline rename of the selection
    ///
    /// A save is requested immediately, before the edit is committed.
    pub fn rename_selected(&self) {
        let Some(selected) = self.view.selected() else {
            return;
        };
        self.view.begin_edit(selected);
        self.saver.save_async();
    }

    /// Stores the name entered by an inline rename
    ///
    /// # Errors
    ///
    /// Returns an error if no model is bound or the node is unknown.
    pub fn commit_rename(&self, node: NodeId, name: &str) -> TreeResult<()> {
        let model = self.model()?;
        model.set_name(node, name)?;
        if self.save_on_rename_commit {
            self.saver.save_async();
        }
        Ok(())
    }

    /// Deletes the selection after confirmation; returns true if deleted
    ///
    /// Protected nodes are never deleted and the confirmer is not asked.
    pub fn delete_selected(&self) -> bool {
        let Some(selected) = self.selected_node() else {
            return false;
        };
        if selected.is_protected() {
            return false;
        }
        if !(self.confirm_delete)(&selected) {
            return false;
        }
        let Some(model) = self.slot.get() else {
            return false;
        };
        match model.delete_node(selected.id) {
            Ok(()) => {
                info!(node_id = %selected.id, name = %selected.name, "Node deleted");
                self.saver.save_async();
                true
            }
            Err(e) => {
                warn!(node_id = %selected.id, error = %e, "Failed to delete node");
                false
            }
        }
    }

    /// Sorts the selected container's children, or the selection's siblings
    /// when a connection is selected, and requests a save
    pub fn sort_selected(&self, order: SortOrder) {
        let Some(selected) = self.selected_node() else {
            return;
        };
        let Some(container) = (if selected.is_container() {
            Some(selected.id)
        } else {
            selected.parent
        }) else {
            return;
        };
        let Some(model) = self.slot.get() else {
            return;
        };
        match model.sort_children(container, order) {
            Ok(()) => self.saver.save_async(),
            Err(e) => warn!(node_id = %container, error = %e, "Failed to sort children"),
        }
    }
}
