//! Property-based tests for the external feed bridge
//!
//! The bridge is subscribed once and always refreshes the full list of
//! external roots of whichever model is bound at notification time.

use std::rc::Rc;

use conntree_core::{
    ConnectionTree, ExternalFeed, ModelHandle, RecordingView, SessionFeed, TreeNode, TreeView,
    ViewCall,
};
use proptest::prelude::*;

fn model_with_external_roots(count: usize) -> (ModelHandle, Vec<conntree_core::NodeId>) {
    let model = ModelHandle::default();
    let roots = (0..count)
        .map(|i| {
            model
                .add_external_root(TreeNode::external_root(format!("discovered-{i}")))
                .unwrap()
        })
        .collect();
    (model, roots)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn notification_refreshes_every_external_root(
        counts in prop::collection::vec(0usize..5, 1..5),
        notifications in 1usize..4
    ) {
        let view = Rc::new(RecordingView::new());
        let feed = Rc::new(SessionFeed::new());
        let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>)
            .with_external_feed(Rc::clone(&feed) as Rc<dyn ExternalFeed>);

        for count in counts {
            let (model, roots) = model_with_external_roots(count);
            tree.attach(model).unwrap();
            prop_assert_eq!(feed.subscriber_count(), 1);
            view.take_calls();

            for _ in 0..notifications {
                feed.notify_changed();
            }

            let expected = vec![ViewCall::RefreshMany(roots); notifications];
            prop_assert_eq!(view.take_calls(), expected);
        }
    }
}

#[test]
fn feed_is_not_bridged_before_first_attach() {
    let view = Rc::new(RecordingView::new());
    let feed = Rc::new(SessionFeed::new());
    let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>)
        .with_external_feed(Rc::clone(&feed) as Rc<dyn ExternalFeed>);

    feed.notify_changed();
    assert_eq!(feed.subscriber_count(), 0);
    assert!(view.calls().is_empty());

    tree.attach(ModelHandle::default()).unwrap();
    assert_eq!(feed.subscriber_count(), 1);
}

#[test]
fn session_changes_inside_external_root_use_model_feed() {
    let view = Rc::new(RecordingView::new());
    let tree = ConnectionTree::new(Rc::clone(&view) as Rc<dyn TreeView>);
    let (model, roots) = model_with_external_roots(1);
    tree.attach(model.clone()).unwrap();
    view.take_calls();

    model
        .add_node(TreeNode::external_session("ssh web-01"), roots[0])
        .unwrap();

    assert_eq!(view.take_refreshes(), vec![ViewCall::RefreshOne(roots[0])]);
}
