//! Gesture handling: clicks, tooltips, selection, expansion and drops.

use tracing::{debug, warn};

use crate::drop_policy::{DropPolicy, DropRejection, DropRequest, ValidatedDrop};
use crate::error::TreeResult;
use crate::models::{NodeId, TreeNode};

use super::ConnectionTree;

/// Listener told about every selection change
pub type SelectionListener = Box<dyn Fn(Option<&TreeNode>) -> TreeResult<()>>;

/// A click on the tree widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellClick {
    /// Row under the pointer, if the click landed on one
    pub node: Option<NodeId>,
    /// Consecutive click count reported by the widget
    pub click_count: u32,
}

impl CellClick {
    /// A single click
    #[must_use]
    pub const fn single(node: Option<NodeId>) -> Self {
        Self {
            node,
            click_count: 1,
        }
    }

    /// A double click
    #[must_use]
    pub const fn double(node: Option<NodeId>) -> Self {
        Self {
            node,
            click_count: 2,
        }
    }
}

/// Handler run for a click
///
/// Receives the clicked node, or `None` when the click missed every row.
pub trait ClickAction {
    /// Handles the click
    fn execute(&self, node: Option<&TreeNode>);
}

impl<F> ClickAction for F
where
    F: Fn(Option<&TreeNode>),
{
    fn execute(&self, node: Option<&TreeNode>) {
        self(node);
    }
}

/// Ordered chain of click handlers
#[derive(Default)]
pub struct ClickHandlerChain {
    actions: Vec<Box<dyn ClickAction>>,
}

impl std::fmt::Debug for ClickHandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickHandlerChain")
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl ClickHandlerChain {
    /// Creates an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler
    pub fn push(&mut self, action: impl ClickAction + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Number of handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if the chain has no handlers
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Runs every handler in order
    pub fn execute(&self, node: Option<&TreeNode>) {
        for action in &self.actions {
            action.execute(node);
        }
    }
}

impl ConnectionTree {
    /// Dispatches a click to the single-click chain (count 1) or the
    /// double-click chain (count 2 and more)
    pub fn on_cell_click(&self, click: CellClick) {
        let node = click
            .node
            .and_then(|id| self.slot.get().and_then(|model| model.node(id)));
        match click.click_count {
            0 => {}
            1 => self.single_click.execute(node.as_ref()),
            _ => self.double_click.execute(node.as_ref()),
        }
    }

    /// Tooltip of a hovered row: the node's description
    ///
    /// Returns `None` for an empty description. Lookup failures are logged.
    #[must_use]
    pub fn tooltip_text(&self, node: NodeId) -> Option<String> {
        let model = match self.model() {
            Ok(model) => model,
            Err(e) => {
                warn!(node_id = %node, error = %e, "Cannot resolve tooltip");
                return None;
            }
        };
        let Some(hovered) = model.node(node) else {
            warn!(node_id = %node, "Tooltip requested for unknown node");
            return None;
        };
        Some(hovered.description).filter(|d| !d.is_empty())
    }

    /// Propagates the widget's new selection to the selection listener
    pub fn on_selection_changed(&self) {
        let Some(listener) = &self.selection_listener else {
            return;
        };
        let selected = self.selected_node();
        if let Err(e) = listener(selected.as_ref()) {
            warn!(
                node_id = ?selected.as_ref().map(|n| n.id),
                error = %e,
                "Selection listener failed"
            );
        }
    }

    /// Records that the widget expanded a container
    pub fn on_expanded(&self, node: NodeId) {
        self.write_expanded(node, true);
    }

    /// Records that the widget collapsed a container
    pub fn on_collapsed(&self, node: NodeId) {
        self.write_expanded(node, false);
    }

    fn write_expanded(&self, node: NodeId, expanded: bool) {
        let Some(model) = self.slot.get() else {
            return;
        };
        if !model.read().node(node).is_some_and(TreeNode::is_container) {
            return;
        }
        if let Err(e) = model.set_expanded(node, expanded) {
            warn!(node_id = %node, expanded, error = %e, "Failed to store expanded state");
        }
    }

    /// Validates a drop proposed by the drag gesture
    ///
    /// # Errors
    ///
    /// Returns the rule the drop breaks, or `DropRejection::Unbound` before
    /// the first attach.
    pub fn can_drop(&self, request: &DropRequest) -> Result<ValidatedDrop, DropRejection> {
        let model = self.slot.get().ok_or(DropRejection::Unbound)?;
        let result = DropPolicy::can_drop(&model.read(), request);
        if let Err(reason) = &result {
            debug!(target_id = %request.target, %reason, "Drop rejected");
        }
        result
    }

    /// Executes a validated drop and requests a save; returns true on success
    pub fn handle_drop(&self, validated: ValidatedDrop) -> bool {
        let Some(model) = self.slot.get() else {
            return false;
        };
        match DropPolicy::on_drop(&model, validated) {
            Ok(()) => {
                self.saver.save_async();
                true
            }
            Err(e) => {
                warn!(error = %e, "Drop failed");
                false
            }
        }
    }
}
