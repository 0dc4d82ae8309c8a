//! Property-based tests for the refresh translation
//!
//! These tests check the refresh chosen for each kind of structural change,
//! both on hand-built notifications and through a bound tree.

use std::collections::HashSet;

use conntree_core::{
    translate, translate_property, CollectionChange, ModelHandle, NodeId, NodeProperty,
    PropertyChange, RefreshScope, TreeNode, ViewCall,
};
use proptest::prelude::*;
use uuid::Uuid;

use crate::fixtures::bind;

// ========== Strategies ==========

fn arb_ids(range: std::ops::Range<usize>) -> impl Strategy<Value = Vec<NodeId>> {
    range.prop_map(|n| (0..n).map(|_| Uuid::new_v4()).collect())
}

/// Existing children, added items and a shuffled merge of both
fn arb_add() -> impl Strategy<Value = (Vec<NodeId>, Vec<NodeId>, Vec<NodeId>)> {
    (arb_ids(0..6), arb_ids(1..4)).prop_flat_map(|(existing, added)| {
        let merged: Vec<NodeId> = existing.iter().chain(added.iter()).copied().collect();
        (Just(existing), Just(added), Just(merged).prop_shuffle())
    })
}

fn arb_property() -> impl Strategy<Value = NodeProperty> {
    prop::sample::select(NodeProperty::ALL.to_vec())
}

fn as_set(ids: &[NodeId]) -> HashSet<NodeId> {
    ids.iter().copied().collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ========== Add ==========

    #[test]
    fn add_refreshes_existing_sibling_or_container(
        (existing, added, after) in arb_add()
    ) {
        let container = Uuid::new_v4();
        let change = CollectionChange::added(container, added.clone(), after.clone());

        match translate(&change) {
            RefreshScope::One(target) if after.len() > 1 && !existing.is_empty() => {
                prop_assert!(existing.contains(&target));
                prop_assert!(!added.contains(&target));
            }
            RefreshScope::One(target) => prop_assert_eq!(target, container),
            other => prop_assert!(false, "unexpected scope {:?}", other),
        }
    }

    #[test]
    fn add_of_only_child_refreshes_container(child in arb_ids(1..2)) {
        let container = Uuid::new_v4();
        let change = CollectionChange::added(container, child.clone(), child);
        prop_assert_eq!(translate(&change), RefreshScope::One(container));
    }

    // ========== Remove ==========

    #[test]
    fn remove_with_survivors_refreshes_removed_items(
        removed in arb_ids(1..4),
        remaining in arb_ids(1..6)
    ) {
        let container = Uuid::new_v4();
        let change = CollectionChange::removed(container, removed.clone(), remaining);
        let targets = translate(&change).targets();
        prop_assert_eq!(as_set(&targets), as_set(&removed));
    }

    #[test]
    fn remove_of_last_children_refreshes_container(removed in arb_ids(1..4)) {
        let container = Uuid::new_v4();
        let change = CollectionChange::removed(container, removed, Vec::new());
        prop_assert_eq!(translate(&change), RefreshScope::One(container));
    }

    // ========== Move and Reset ==========

    #[test]
    fn move_refreshes_moved_items(moved in arb_ids(1..4), others in arb_ids(0..5)) {
        let container = Uuid::new_v4();
        let after: Vec<NodeId> = others.iter().chain(moved.iter()).copied().collect();
        let change = CollectionChange::moved(container, moved.clone(), after);
        prop_assert_eq!(as_set(&translate(&change).targets()), as_set(&moved));
    }

    #[test]
    fn reset_refreshes_container_only(children in arb_ids(0..8)) {
        let container = Uuid::new_v4();
        let change = CollectionChange::reset(container, children);
        prop_assert_eq!(translate(&change), RefreshScope::One(container));
    }

    // ========== Property allow-list ==========

    #[test]
    fn only_name_and_open_connections_refresh(property in arb_property()) {
        let sender = Uuid::new_v4();
        let scope = translate_property(&PropertyChange { sender, property });
        let allowed = matches!(property, NodeProperty::Name | NodeProperty::OpenConnections);
        if allowed {
            prop_assert_eq!(scope, RefreshScope::One(sender));
        } else {
            prop_assert_eq!(scope, RefreshScope::Nothing);
        }
    }

    // ========== Through a bound tree ==========

    #[test]
    fn bound_tree_never_refreshes_the_added_node(count in 1usize..8) {
        let bound = bind(ModelHandle::default(), |t| t);
        let container = bound.root();
        for i in 0..count {
            let id = bound
                .model
                .add_node(TreeNode::connection(format!("n{i}")), container)
                .unwrap();
            let refreshes = bound.view.take_refreshes();
            prop_assert_eq!(refreshes.len(), 1);
            let expected = if i == 0 {
                ViewCall::RefreshOne(container)
            } else {
                ViewCall::RefreshOne(bound.model.read().children(container)[0])
            };
            prop_assert_eq!(&refreshes[0], &expected);
            prop_assert_ne!(&refreshes[0], &ViewCall::RefreshOne(id));
        }
    }
}

// ========== Scenarios ==========

#[test]
fn scenario_first_child_then_sibling_rule() {
    let bound = bind(ModelHandle::default(), |t| t);
    let c = bound
        .model
        .add_node(TreeNode::container("C"), bound.root())
        .unwrap();
    bound.view.take_calls();

    let y = bound.model.add_node(TreeNode::connection("y"), c).unwrap();
    assert_eq!(bound.view.take_refreshes(), vec![ViewCall::RefreshOne(c)]);

    let z = bound.model.add_node(TreeNode::connection("z"), c).unwrap();
    let refreshes = bound.view.take_refreshes();
    assert_eq!(refreshes, vec![ViewCall::RefreshOne(y)]);
    assert!(!refreshes.contains(&ViewCall::RefreshOne(z)));
}

#[test]
fn scenario_remove_until_empty() {
    let bound = bind(ModelHandle::default(), |t| t);
    let c = bound
        .model
        .add_node(TreeNode::container("C"), bound.root())
        .unwrap();
    let x = bound.model.add_node(TreeNode::connection("x"), c).unwrap();
    let y = bound.model.add_node(TreeNode::connection("y"), c).unwrap();
    bound.view.take_calls();

    bound.model.delete_node(x).unwrap();
    assert_eq!(bound.view.take_refreshes(), vec![ViewCall::RefreshMany(vec![x])]);

    bound.model.delete_node(y).unwrap();
    assert_eq!(bound.view.take_refreshes(), vec![ViewCall::RefreshOne(c)]);
}

#[test]
fn scenario_property_refresh_follows_allow_list() {
    let bound = bind(ModelHandle::default(), |t| t);
    let x = bound
        .model
        .add_node(TreeNode::connection("x"), bound.root())
        .unwrap();
    bound.view.take_calls();

    bound.model.set_description(x, "ignored").unwrap();
    assert!(bound.view.take_refreshes().is_empty());

    bound.model.set_open_connections(x, 2).unwrap();
    bound.model.set_name(x, "x2").unwrap();
    assert_eq!(
        bound.view.take_refreshes(),
        vec![ViewCall::RefreshOne(x), ViewCall::RefreshOne(x)]
    );
}
