//! Test fixtures for the connection tree.
//!
//! This module provides a counting saver, a bound tree harness and helpers
//! that build models from generated shapes.

use std::cell::Cell;
use std::rc::Rc;

use conntree_core::{
    ConnectionTree, ModelHandle, NodeId, RecordingView, SaveRequester, TreeNode, TreeView,
};

/// Saver that only counts requests
#[derive(Debug, Default)]
pub struct CountingSaver {
    requests: Cell<usize>,
}

impl CountingSaver {
    /// Number of save requests so far
    #[must_use]
    pub fn requests(&self) -> usize {
        self.requests.get()
    }
}

impl SaveRequester for CountingSaver {
    fn save_async(&self) {
        self.requests.set(self.requests.get() + 1);
    }
}

/// A tree bound to a fresh model, with its view and saver exposed
pub struct BoundTree {
    pub view: Rc<RecordingView>,
    pub saver: Rc<CountingSaver>,
    pub model: ModelHandle,
    pub tree: ConnectionTree,
}

impl BoundTree {
    /// Permanent root of the bound model
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.model.read().root_id()
    }
}

/// Binds `model` to a new tree configured by `configure`
///
/// Calls recorded during attach are discarded.
pub fn bind(
    model: ModelHandle,
    configure: impl FnOnce(ConnectionTree) -> ConnectionTree,
) -> BoundTree {
    let view = Rc::new(RecordingView::new());
    let saver = Rc::new(CountingSaver::default());
    let tree = configure(
        ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>)
            .with_saver(Rc::clone(&saver) as Rc<dyn SaveRequester>),
    );
    tree.attach(model.clone()).expect("attach");
    view.take_calls();
    BoundTree {
        view,
        saver,
        model,
        tree,
    }
}

/// One generated node: which existing container it goes under, and its kind
#[derive(Debug, Clone)]
pub struct NodeShape {
    pub parent_pick: usize,
    pub container: bool,
    pub name: String,
}

/// Builds a model from shapes; returns it with every non-root node id
///
/// `parent_pick` indexes the containers created so far (root included),
/// modulo their count.
pub fn build_model(shapes: &[NodeShape]) -> (ModelHandle, Vec<NodeId>) {
    let model = ModelHandle::default();
    let mut containers = vec![model.read().root_id()];
    let mut ids = Vec::with_capacity(shapes.len());
    for shape in shapes {
        let parent = containers[shape.parent_pick % containers.len()];
        let node = if shape.container {
            TreeNode::container(shape.name.clone())
        } else {
            TreeNode::connection(shape.name.clone())
        };
        let id = model.add_node(node, parent).expect("add node");
        if shape.container {
            containers.push(id);
        }
        ids.push(id);
    }
    (model, ids)
}

/// Containers of a model in pre-order, roots included
#[must_use]
pub fn containers(model: &ModelHandle) -> Vec<NodeId> {
    let model = model.read();
    model
        .depth_first()
        .into_iter()
        .filter(|id| model.node(*id).is_some_and(TreeNode::is_container))
        .collect()
}
