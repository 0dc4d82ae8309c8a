//! One-shot actions run after a model is attached.

use crate::error::{TreeError, TreeResult};
use crate::models::TreeNode;

use super::ConnectionTree;

/// Deferred initialization that needs a populated view
///
/// Every action runs exactly once per attach, in registration order. A
/// failing action is logged and does not stop the ones after it. Calling
/// [`ConnectionTree::attach`] from an action fails with
/// [`TreeError::ReentrantAttach`].
pub trait PostAttachAction {
    /// Runs the action against the freshly bound tree
    ///
    /// # Errors
    ///
    /// Returns an error if the action could not complete.
    fn run(&self, tree: &ConnectionTree) -> TreeResult<()>;

    /// Name used in diagnostics
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> PostAttachAction for F
where
    F: Fn(&ConnectionTree) -> TreeResult<()>,
{
    fn run(&self, tree: &ConnectionTree) -> TreeResult<()> {
        self(tree)
    }
}

/// Expands the permanent root
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpandRootNode;

impl PostAttachAction for ExpandRootNode {
    fn run(&self, tree: &ConnectionTree) -> TreeResult<()> {
        let root = tree.root_connection_node().ok_or(TreeError::Unbound)?;
        tree.view().expand(root.id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "expand-root"
    }
}

/// Re-expands every container whose stored flag says it was expanded
#[derive(Debug, Default, Clone, Copy)]
pub struct RestoreExpandedContainers;

impl PostAttachAction for RestoreExpandedContainers {
    fn run(&self, tree: &ConnectionTree) -> TreeResult<()> {
        let model = tree.model()?;
        let expanded: Vec<_> = {
            let model = model.read();
            model
                .depth_first()
                .into_iter()
                .filter(|id| {
                    model
                        .node(*id)
                        .is_some_and(|n: &TreeNode| n.is_container() && n.expanded)
                })
                .collect()
        };
        for id in expanded {
            tree.view().expand(id);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "restore-expanded"
    }
}

/// Selects the permanent root
#[derive(Debug, Default, Clone, Copy)]
pub struct SelectRootNode;

impl PostAttachAction for SelectRootNode {
    fn run(&self, tree: &ConnectionTree) -> TreeResult<()> {
        let root = tree.root_connection_node().ok_or(TreeError::Unbound)?;
        tree.view().select(root.id);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "select-root"
    }
}
