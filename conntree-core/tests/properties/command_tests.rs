//! Property-based tests for the node commands
//!
//! Commands run against the widget's selection and never surface failures.

use std::rc::Rc;

use conntree_core::{
    spawn_save_worker, ConfigManager, ConnectionTree, ModelHandle, NodeId, RecordingView,
    SnapshotSaver, TreeNode, TreeView, ViewCall,
};
use proptest::prelude::*;
use tempfile::TempDir;

use crate::fixtures::{bind, build_model, NodeShape};

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
        1..12,
    )
}

fn pick(ids: &[NodeId], index: usize) -> NodeId {
    ids[index % ids.len()]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn delete_of_protected_nodes_is_noop(shapes in arb_shapes(), index in 0usize..16) {
        let (model, _) = build_model(&shapes);
        let external = model
            .add_external_root(TreeNode::external_root("sessions"))
            .unwrap();
        let session = model
            .add_node(TreeNode::external_session("ssh host"), external)
            .unwrap();
        let bound = bind(model, |t| t.with_deletion_confirmer(|_| true));
        let protected = [bound.root(), external, session];
        let target = protected[index % protected.len()];
        let before = bound.model.read().snapshot();
        let len = bound.model.read().len();

        bound.view.set_selected(Some(target));
        prop_assert!(!bound.tree.delete_selected());

        prop_assert_eq!(bound.model.read().len(), len);
        prop_assert_eq!(bound.model.read().snapshot(), before);
        prop_assert_eq!(bound.saver.requests(), 0);
    }

    #[test]
    fn declined_delete_is_noop(shapes in arb_shapes(), index in 0usize..16) {
        let (model, ids) = build_model(&shapes);
        let bound = bind(model, |t| t.with_deletion_confirmer(|_| false));
        let target = pick(&ids, index);
        let len = bound.model.read().len();

        bound.view.set_selected(Some(target));
        prop_assert!(!bound.tree.delete_selected());

        prop_assert!(bound.model.read().contains(target));
        prop_assert_eq!(bound.model.read().len(), len);
        prop_assert_eq!(bound.saver.requests(), 0);
        prop_assert!(bound.view.take_calls().is_empty());
    }

    #[test]
    fn confirmed_delete_removes_subtree_and_saves(shapes in arb_shapes(), index in 0usize..16) {
        let (model, ids) = build_model(&shapes);
        let bound = bind(model, |t| t.with_deletion_confirmer(|_| true));
        let target = pick(&ids, index);
        let doomed = 1 + bound.model.read().descendants(target).len();
        let len = bound.model.read().len();

        bound.view.set_selected(Some(target));
        prop_assert!(bound.tree.delete_selected());

        prop_assert!(!bound.model.read().contains(target));
        prop_assert_eq!(bound.model.read().len(), len - doomed);
        prop_assert_eq!(bound.saver.requests(), 1);
    }

    #[test]
    fn add_goes_under_selected_container_or_its_parent(
        shapes in arb_shapes(),
        index in 0usize..16,
        folder in any::<bool>()
    ) {
        let (model, ids) = build_model(&shapes);
        let bound = bind(model, |t| t);
        let selected = pick(&ids, index);
        let selection = bound.model.node(selected).unwrap();
        let expected_parent = if selection.is_container() {
            selected
        } else {
            selection.parent.unwrap()
        };

        bound.view.set_selected(Some(selected));
        let id = if folder {
            bound.tree.add_folder()
        } else {
            bound.tree.add_connection()
        }
        .unwrap();

        prop_assert_eq!(bound.model.read().parent_of(id), Some(expected_parent));
        let last_child = bound.model.read().children(expected_parent).last().copied();
        prop_assert_eq!(last_child.as_ref(), Some(&id));
        prop_assert_eq!(bound.view.selected(), Some(id));
        prop_assert!(bound.view.is_expanded(expected_parent));
        let calls = bound.view.take_calls();
        prop_assert!(calls.ends_with(&[ViewCall::Select(id), ViewCall::ScrollIntoView(id)]));
    }

    #[test]
    fn duplicate_copies_subtree_after_original(shapes in arb_shapes(), index in 0usize..16) {
        let (model, ids) = build_model(&shapes);
        let bound = bind(model, |t| t);
        let original = pick(&ids, index);
        let parent = bound.model.read().parent_of(original).unwrap();
        let size = bound.model.read().descendants(original).len();

        bound.view.set_selected(Some(original));
        let copy = bound.tree.duplicate_selected().unwrap();

        let model = bound.model.read();
        let siblings = model.children(parent);
        let at = siblings.iter().position(|c| *c == original).unwrap();
        prop_assert_eq!(siblings.get(at + 1), Some(&copy));
        prop_assert_eq!(model.descendants(copy).len(), size);
        prop_assert_eq!(&model.node(copy).unwrap().name, &model.node(original).unwrap().name);
        prop_assert_eq!(bound.saver.requests(), 1);
    }
}

#[test]
fn commands_without_selection_do_nothing() {
    let (model, _) = build_model(&[NodeShape {
        parent_pick: 0,
        container: false,
        name: "x".to_string(),
    }]);
    let bound = bind(model, |t| t);

    assert_eq!(bound.tree.add_connection(), None);
    assert_eq!(bound.tree.add_folder(), None);
    assert_eq!(bound.tree.duplicate_selected(), None);
    bound.tree.rename_selected();
    assert!(!bound.tree.delete_selected());

    assert_eq!(bound.model.read().len(), 2);
    assert_eq!(bound.saver.requests(), 0);
    assert!(bound.view.take_calls().is_empty());
}

#[tokio::test]
async fn snapshot_saver_persists_commands() {
    let dir = TempDir::new().unwrap();
    let config = ConfigManager::with_config_dir(dir.path().to_path_buf());
    let (tx, worker) = spawn_save_worker(config.clone());

    {
        let model = ModelHandle::default();
        let view = Rc::new(RecordingView::new());
        let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>);
        let saver = SnapshotSaver::new(tree.model_slot(), tx);
        let tree = tree.with_saver(Rc::new(saver));
        tree.attach(model.clone()).unwrap();

        let root = model.read().root_id();
        view.set_selected(Some(root));
        let folder = tree.add_folder().unwrap();
        view.set_selected(Some(folder));
        tree.duplicate_selected().unwrap();
    }

    worker.await.unwrap();
    let saved = config.load_tree().unwrap().unwrap();
    assert_eq!(saved.root.children.len(), 2);
}
