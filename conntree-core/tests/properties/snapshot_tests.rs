//! Property-based tests for persistence of the tree
//!
//! Saved trees reload with the same structure; external-session roots are
//! never written.

use conntree_core::{ConfigManager, ConnectionTreeModel, TreeNode};
use proptest::prelude::*;
use tempfile::TempDir;

use crate::fixtures::{build_model, NodeShape};

fn arb_shapes() -> impl Strategy<Value = Vec<NodeShape>> {
    prop::collection::vec(
        (0usize..16, any::<bool>(), "[a-zA-Z0-9 _-]{1,12}").prop_map(
            |(parent_pick, container, name)| NodeShape {
                parent_pick,
                container,
                name,
            },
        ),
        0..16,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn saved_tree_reloads_with_same_structure(shapes in arb_shapes()) {
        let (model, _) = build_model(&shapes);
        model
            .add_external_root(TreeNode::external_root("sessions"))
            .unwrap();
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::with_config_dir(dir.path().to_path_buf());

        config.save_tree(&model.read().snapshot()).unwrap();
        let loaded = config.load_tree().unwrap().unwrap();
        let restored = ConnectionTreeModel::from_snapshot(&loaded).unwrap();

        let original = model.read();
        prop_assert_eq!(restored.len(), shapes.len() + 1);
        prop_assert!(restored.external_roots().is_empty());
        for id in original.descendants(original.root_id()) {
            let before = original.node(id).unwrap();
            let after = restored.node(id).unwrap();
            prop_assert_eq!(&before.name, &after.name);
            prop_assert_eq!(before.kind, after.kind);
            prop_assert_eq!(restored.children(id), original.children(id));
        }
    }
}
