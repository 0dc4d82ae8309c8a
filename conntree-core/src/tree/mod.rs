//! Observable connection tree model
//!
//! This module provides the arena-backed [`ConnectionTreeModel`], the change
//! notifications it produces and the shared [`ModelHandle`] that delivers
//! them to subscribers.

mod event;
mod handle;
mod model;
mod snapshot;

pub use event::{ChangeAction, CollectionChange, NodeProperty, PropertyChange};
pub use handle::{ModelHandle, ModelSlot};
pub use model::{ConnectionTreeModel, DetachedSubtree, Placement, PropertyUpdate, SortOrder};
pub use snapshot::{NodeRecord, TreeSnapshot, SNAPSHOT_VERSION};
