//! Property-based tests for the attach lifecycle
//!
//! Re-attaching must leave no subscription behind on the previous model, and
//! post-attach actions must run once per attach.

use std::cell::Cell;
use std::rc::Rc;

use conntree_core::{
    ConnectionTree, ExpandRootNode, ModelHandle, RecordingView, SelectRootNode, SortOrder,
    TreeNode, TreeResult, TreeView, ViewCall,
};
use proptest::prelude::*;

use crate::fixtures::{bind, build_model, containers, NodeShape};

// ========== Strategies ==========

fn arb_shape() -> impl Strategy<Value = NodeShape> {
    (0usize..16, any::<bool>(), "[a-z]{1,8}").prop_map(|(parent_pick, container, name)| {
        NodeShape {
            parent_pick,
            container,
            name,
        }
    })
}

fn arb_shapes() -> impl Strategy<Value = Vec<NodeShape>> {
    prop::collection::vec(arb_shape(), 0..12)
}

/// A mutation applied to the stale model
#[derive(Debug, Clone)]
enum StaleEdit {
    Add(usize),
    Delete(usize),
    Rename(usize),
    Sort(usize),
}

fn arb_edit() -> impl Strategy<Value = StaleEdit> {
    prop_oneof![
        (0usize..32).prop_map(StaleEdit::Add),
        (0usize..32).prop_map(StaleEdit::Delete),
        (0usize..32).prop_map(StaleEdit::Rename),
        (0usize..32).prop_map(StaleEdit::Sort),
    ]
}

fn apply(model: &ModelHandle, edit: &StaleEdit) {
    let all = model.read().depth_first();
    let folders = containers(model);
    match *edit {
        StaleEdit::Add(i) => {
            let parent = folders[i % folders.len()];
            model.add_node(TreeNode::connection("late"), parent).unwrap();
        }
        StaleEdit::Delete(i) => {
            let id = all[i % all.len()];
            // Roots refuse deletion; that is fine here.
            let _ = model.delete_node(id);
        }
        StaleEdit::Rename(i) => {
            let id = all[i % all.len()];
            model.set_name(id, format!("renamed-{i}")).unwrap();
        }
        StaleEdit::Sort(i) => {
            let id = folders[i % folders.len()];
            model.sort_children(id, SortOrder::Descending).unwrap();
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn reattach_leaves_no_stale_subscription(
        shapes_a in arb_shapes(),
        shapes_b in arb_shapes(),
        edits in prop::collection::vec(arb_edit(), 1..10)
    ) {
        let (model_a, _) = build_model(&shapes_a);
        let (model_b, _) = build_model(&shapes_b);
        let bound = bind(model_a.clone(), |t| t);

        bound.tree.attach(model_b.clone()).unwrap();
        bound.view.take_calls();

        for edit in &edits {
            apply(&model_a, edit);
        }

        prop_assert!(bound.view.take_calls().is_empty());
        prop_assert_eq!(model_a.subscriber_count(), 0);
        prop_assert_eq!(model_b.subscriber_count(), 2);
    }

    #[test]
    fn attach_publishes_roots_of_new_model(shapes in arb_shapes()) {
        let (model, _) = build_model(&shapes);
        let bound = bind(ModelHandle::default(), |t| t);

        bound.tree.attach(model.clone()).unwrap();

        let roots = model.read().roots().to_vec();
        let calls = bound.view.take_calls();
        prop_assert_eq!(calls.first(), Some(&ViewCall::SetRoots(roots)));
        prop_assert_eq!(bound.tree.node_searcher().len(), shapes.len() + 1);
    }

    #[test]
    fn post_attach_actions_run_once_per_attach(attaches in 1usize..6) {
        let runs = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&runs);
        let bound = bind(ModelHandle::default(), move |t| {
            t.with_post_attach_action(move |_: &ConnectionTree| -> TreeResult<()> {
                counter.set(counter.get() + 1);
                Ok(())
            })
        });

        for _ in 1..attaches {
            bound.tree.attach(ModelHandle::default()).unwrap();
        }

        prop_assert_eq!(runs.get(), attaches);
    }
}

#[test]
fn shipped_actions_expand_then_select_root() {
    let model = ModelHandle::default();
    let root = model.read().root_id();
    let view = Rc::new(RecordingView::new());
    let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>)
        .with_post_attach_action(ExpandRootNode)
        .with_post_attach_action(SelectRootNode);

    tree.attach(model).unwrap();

    assert_eq!(
        view.take_calls(),
        vec![
            ViewCall::SetRoots(vec![root]),
            ViewCall::Expand(root),
            ViewCall::Select(root),
        ]
    );
    assert_eq!(tree.selected_node().map(|n| n.id), Some(root));
}
