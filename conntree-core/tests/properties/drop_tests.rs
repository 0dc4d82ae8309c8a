//! Property-based tests for the drop policy
//!
//! A drop that fails validation never reaches the model. A valid drop of one
//! node produces exactly one Move naming that node.

use std::cell::RefCell;
use std::rc::Rc;

use conntree_core::{
    ChangeAction, CollectionChange, DropPosition, DropRejection, DropRequest, NodeId, TreeNode,
    ViewCall,
};
use proptest::prelude::*;

use crate::fixtures::{bind, build_model, containers, NodeShape};

// ========== Strategies ==========

fn arb_shapes() -> impl Strategy<Value = Vec<NodeShape>> {
    prop::collection::vec(
        (0usize..16, any::<bool>(), "[a-z]{1,8}").prop_map(|(parent_pick, container, name)| {
            NodeShape {
                parent_pick,
                container,
                name,
            }
        }),
        1..16,
    )
}

fn pick(ids: &[NodeId], index: usize) -> NodeId {
    ids[index % ids.len()]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn drop_onto_self_or_descendant_is_rejected(
        shapes in arb_shapes(),
        node_pick in 0usize..16,
        target_pick in 0usize..16,
        position in prop_oneof![
            Just(DropPosition::Into),
            Just(DropPosition::Before),
            Just(DropPosition::After)
        ]
    ) {
        let (model, ids) = build_model(&shapes);
        let node = pick(&ids, node_pick);
        let mut inside = vec![node];
        inside.extend(model.read().descendants(node));
        let target = pick(&inside, target_pick);
        let bound = bind(model, |t| t);
        let before = bound.model.read().snapshot();

        let request = DropRequest {
            dragged: vec![node],
            target,
            position,
        };
        let result = bound.tree.can_drop(&request);

        prop_assert!(result.is_err(), "drop of {} onto {} accepted", node, target);
        prop_assert_eq!(bound.model.read().snapshot(), before);
        prop_assert!(bound.view.take_calls().is_empty());
    }

    #[test]
    fn valid_drop_emits_single_move(
        shapes in arb_shapes(),
        node_pick in 0usize..16,
        target_pick in 0usize..16
    ) {
        let (model, ids) = build_model(&shapes);
        let node = pick(&ids, node_pick);
        let unrelated: Vec<NodeId> = containers(&model)
            .into_iter()
            .filter(|c| *c != node && !model.read().is_ancestor(node, *c))
            .collect();
        let target = pick(&unrelated, target_pick);
        let bound = bind(model, |t| t);
        let events = Rc::new(RefCell::new(Vec::<CollectionChange>::new()));
        let sink = Rc::clone(&events);
        bound
            .model
            .subscribe_collection(move |c| sink.borrow_mut().push(c.clone()));

        let validated = bound
            .tree
            .can_drop(&DropRequest::into_container(node, target))
            .unwrap();
        prop_assert!(bound.tree.handle_drop(validated));

        let events = events.borrow();
        prop_assert_eq!(events.len(), 1);
        prop_assert_eq!(events[0].action, Some(ChangeAction::Move));
        prop_assert_eq!(&events[0].old_items, &vec![node]);
        prop_assert_eq!(bound.model.read().parent_of(node), Some(target));
        prop_assert_eq!(bound.view.take_refreshes(), vec![ViewCall::RefreshMany(vec![node])]);
        prop_assert_eq!(bound.saver.requests(), 1);
    }
}

#[test]
fn protected_nodes_and_external_targets_are_rejected() {
    let (model, ids) = build_model(&[NodeShape {
        parent_pick: 0,
        container: true,
        name: "folder".to_string(),
    }]);
    let external = model
        .add_external_root(TreeNode::external_root("sessions"))
        .unwrap();
    let session = model
        .add_node(TreeNode::external_session("ssh host"), external)
        .unwrap();
    let bound = bind(model, |t| t);
    let root = bound.root();
    let folder = ids[0];

    assert_eq!(
        bound.tree.can_drop(&DropRequest::into_container(root, folder)),
        Err(DropRejection::ProtectedSource(root))
    );
    assert_eq!(
        bound.tree.can_drop(&DropRequest::into_container(session, folder)),
        Err(DropRejection::ProtectedSource(session))
    );
    assert_eq!(
        bound.tree.can_drop(&DropRequest::into_container(folder, external)),
        Err(DropRejection::ProtectedTarget(external))
    );
    assert_eq!(
        bound.tree.can_drop(&DropRequest {
            dragged: vec![folder],
            target: root,
            position: DropPosition::Before,
        }),
        Err(DropRejection::BesideRoot(root))
    );
}
