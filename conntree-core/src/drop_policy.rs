//! Validation and execution of drag-and-drop reparenting.
//!
//! [`DropPolicy::can_drop`] is the only way to obtain a [`ValidatedDrop`], and
//! [`DropPolicy::on_drop`] only accepts one, so a rejected drop cannot be
//! executed.

use std::collections::HashSet;

use tracing::debug;

use crate::error::ModelResult;
use crate::models::NodeId;
use crate::tree::{ConnectionTreeModel, ModelHandle, Placement};

/// Drop position relative to the target row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPosition {
    /// Drop before the target row, as its sibling
    Before,
    /// Drop after the target row, as its sibling
    After,
    /// Drop into the target container, as its last child
    #[default]
    Into,
}

/// A drop proposed by the drag gesture handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropRequest {
    /// Dragged nodes in display order
    pub dragged: Vec<NodeId>,
    /// Row under the pointer
    pub target: NodeId,
    /// Where relative to the target row
    pub position: DropPosition,
}

impl DropRequest {
    /// A single node dropped into a container
    #[must_use]
    pub fn into_container(node: NodeId, container: NodeId) -> Self {
        Self {
            dragged: vec![node],
            target: container,
            position: DropPosition::Into,
        }
    }
}

/// Why a drop was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropRejection {
    /// No model is attached to the tree
    #[error("No model is attached")]
    Unbound,
    /// Nothing is being dragged
    #[error("Nothing to drop")]
    NothingDragged,
    /// A referenced node is not in the model
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    /// A dragged node is protected
    #[error("Node {0} cannot be moved")]
    ProtectedSource(NodeId),
    /// The target is protected against drops
    #[error("Node {0} does not accept drops")]
    ProtectedTarget(NodeId),
    /// Dropping into or next to a connection row's inside
    #[error("Node {0} is not a container")]
    NotAContainer(NodeId),
    /// Dropping next to a root
    #[error("Cannot drop beside root {0}")]
    BesideRoot(NodeId),
    /// The drop would place a node under itself
    #[error("Node {node} cannot be dropped onto itself or its descendant {target}")]
    Cycle {
        /// The dragged node
        node: NodeId,
        /// The target row
        target: NodeId,
    },
}

/// A drop that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDrop {
    moves: Vec<(NodeId, Placement)>,
}

impl ValidatedDrop {
    /// Node moves in execution order
    #[must_use]
    pub fn moves(&self) -> &[(NodeId, Placement)] {
        &self.moves
    }
}

/// Drop rules of the connection tree
#[derive(Debug, Default, Clone, Copy)]
pub struct DropPolicy;

impl DropPolicy {
    /// Validates a drop against the model
    ///
    /// # Errors
    ///
    /// Returns the first rule the drop breaks. A node listed more than once
    /// is moved once, at its first position.
    pub fn can_drop(
        model: &ConnectionTreeModel,
        request: &DropRequest,
    ) -> Result<ValidatedDrop, DropRejection> {
        if request.dragged.is_empty() {
            return Err(DropRejection::NothingDragged);
        }
        let target = model
            .node(request.target)
            .ok_or(DropRejection::UnknownNode(request.target))?;

        let destination = match request.position {
            DropPosition::Into => {
                if !target.is_container() {
                    return Err(DropRejection::NotAContainer(target.id));
                }
                target.id
            }
            DropPosition::Before | DropPosition::After => {
                target.parent.ok_or(DropRejection::BesideRoot(target.id))?
            }
        };
        let destination_node = model
            .node(destination)
            .ok_or(DropRejection::UnknownNode(destination))?;
        if target.role.is_external() || !destination_node.role.accepts_user_children() {
            return Err(DropRejection::ProtectedTarget(target.id));
        }

        let mut seen = HashSet::with_capacity(request.dragged.len());
        let mut moves = Vec::with_capacity(request.dragged.len());
        let mut anchor = match request.position {
            DropPosition::Into => Placement::Append(destination),
            DropPosition::Before => Placement::Before(target.id),
            DropPosition::After => Placement::After(target.id),
        };
        for &node_id in &request.dragged {
            if !seen.insert(node_id) {
                continue;
            }
            let node = model
                .node(node_id)
                .ok_or(DropRejection::UnknownNode(node_id))?;
            if node.is_protected() {
                return Err(DropRejection::ProtectedSource(node_id));
            }
            if node_id == target.id
                || node_id == destination
                || model.is_ancestor(node_id, destination)
            {
                return Err(DropRejection::Cycle {
                    node: node_id,
                    target: target.id,
                });
            }
            moves.push((node_id, anchor));
            if !matches!(anchor, Placement::Append(_)) {
                anchor = Placement::After(node_id);
            }
        }
        Ok(ValidatedDrop { moves })
    }

    /// Executes a validated drop; each node produces one Move notification
    ///
    /// # Errors
    ///
    /// Returns an error if the model changed since validation in a way that
    /// invalidates a move. Moves already applied stay applied.
    pub fn on_drop(model: &ModelHandle, validated: ValidatedDrop) -> ModelResult<()> {
        for (node, placement) in validated.moves {
            debug!(node_id = %node, ?placement, "Dropping node");
            model.move_node(node, placement)?;
        }
        Ok(())
    }
}
