//! Translation of model notifications into view refresh instructions.
//!
//! Both functions here are pure: they look only at the notification, which
//! carries the container's child list as it was right after the change.

use crate::models::NodeId;
use crate::tree::{ChangeAction, CollectionChange, NodeProperty, PropertyChange};
use crate::view::TreeView;

/// Properties whose change redraws the sender's row
pub const REFRESHING_PROPERTIES: [NodeProperty; 2] =
    [NodeProperty::Name, NodeProperty::OpenConnections];

/// What the view has to redraw after a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshScope {
    /// Nothing to redraw
    Nothing,
    /// Redraw one row
    One(NodeId),
    /// Redraw a set of rows
    Many(Vec<NodeId>),
}

impl RefreshScope {
    /// Issues the refresh against a view
    pub fn apply(&self, view: &dyn TreeView) {
        match self {
            Self::Nothing => {}
            Self::One(id) => view.refresh_one(*id),
            Self::Many(ids) => view.refresh_many(ids),
        }
    }

    /// Identities the scope covers
    #[must_use]
    pub fn targets(&self) -> Vec<NodeId> {
        match self {
            Self::Nothing => Vec::new(),
            Self::One(id) => vec![*id],
            Self::Many(ids) => ids.clone(),
        }
    }
}

/// Decides the minimal refresh for a structural change
///
/// On Add the container is redrawn through a pre-existing sibling: the
/// sibling's row is already materialised, and redrawing it recomputes the
/// parent's expander from the live child count. The new row may not exist
/// yet when the decorator runs. With no such sibling the container itself is
/// redrawn.
#[must_use]
pub fn translate(change: &CollectionChange) -> RefreshScope {
    let Some(source) = change.source else {
        return RefreshScope::Nothing;
    };
    match change.action {
        Some(ChangeAction::Add) => {
            if change.children_after.len() > 1 {
                if let Some(sibling) = change
                    .children_after
                    .iter()
                    .find(|child| !change.new_items.contains(child))
                {
                    return RefreshScope::One(*sibling);
                }
            }
            RefreshScope::One(source)
        }
        Some(ChangeAction::Remove) => {
            if change.children_after.is_empty() {
                RefreshScope::One(source)
            } else {
                RefreshScope::Many(change.old_items.clone())
            }
        }
        Some(ChangeAction::Move) => RefreshScope::Many(change.old_items.clone()),
        Some(ChangeAction::Reset) => RefreshScope::One(source),
        Some(ChangeAction::Replace) | None => RefreshScope::Nothing,
    }
}

/// Returns true if a change of this property redraws the sender's row
#[must_use]
pub fn refreshes_on(property: NodeProperty) -> bool {
    REFRESHING_PROPERTIES.contains(&property)
}

/// Decides the refresh for a property change
///
/// Duplicate deliveries yield duplicate refreshes, which are harmless.
#[must_use]
pub fn translate_property(change: &PropertyChange) -> RefreshScope {
    if refreshes_on(change.property) {
        RefreshScope::One(change.sender)
    } else {
        RefreshScope::Nothing
    }
}
