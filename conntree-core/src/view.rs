//! Interface to the widget that renders the tree.
//!
//! The core never owns rows; it tells the widget which nodes to redraw, keyed
//! by node identity. [`RecordingView`] is a headless implementation that
//! records every call, used by the CLI and the tests.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;

use crate::models::NodeId;

/// Operations the core issues against the rendering widget
///
/// Methods take `&self`; widgets keep their own interior state.
pub trait TreeView {
    /// Replaces the displayed root set
    fn set_roots(&self, roots: &[NodeId]);

    /// Redraws one row (and its expander)
    fn refresh_one(&self, node: NodeId);

    /// Redraws a set of rows
    fn refresh_many(&self, nodes: &[NodeId]);

    /// Expands a container row
    fn expand(&self, node: NodeId);

    /// Selects a row
    fn select(&self, node: NodeId);

    /// Scrolls until the row is visible
    fn scroll_into_view(&self, node: NodeId);

    /// Currently selected row, if any
    fn selected(&self) -> Option<NodeId>;

    /// Puts the row into inline-edit mode
    fn begin_edit(&self, node: NodeId);

    /// Rebuilds every row, optionally keeping expansion and selection
    fn rebuild_all(&self, preserve_state: bool);
}

/// A call made against a [`RecordingView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    /// `set_roots`
    SetRoots(Vec<NodeId>),
    /// `refresh_one`
    RefreshOne(NodeId),
    /// `refresh_many`
    RefreshMany(Vec<NodeId>),
    /// `expand`
    Expand(NodeId),
    /// `select`
    Select(NodeId),
    /// `scroll_into_view`
    ScrollIntoView(NodeId),
    /// `begin_edit`
    BeginEdit(NodeId),
    /// `rebuild_all`
    RebuildAll {
        /// Whether state was preserved
        preserve_state: bool,
    },
}

impl ViewCall {
    /// Returns true for the calls that redraw rows
    #[must_use]
    pub const fn is_refresh(&self) -> bool {
        matches!(self, Self::RefreshOne(_) | Self::RefreshMany(_))
    }
}

impl std::fmt::Display for ViewCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn list(ids: &[NodeId]) -> String {
            ids.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }
        match self {
            Self::SetRoots(ids) => write!(f, "set_roots [{}]", list(ids)),
            Self::RefreshOne(id) => write!(f, "refresh_one {id}"),
            Self::RefreshMany(ids) => write!(f, "refresh_many [{}]", list(ids)),
            Self::Expand(id) => write!(f, "expand {id}"),
            Self::Select(id) => write!(f, "select {id}"),
            Self::ScrollIntoView(id) => write!(f, "scroll_into_view {id}"),
            Self::BeginEdit(id) => write!(f, "begin_edit {id}"),
            Self::RebuildAll { preserve_state } => {
                write!(f, "rebuild_all preserve_state={preserve_state}")
            }
        }
    }
}

/// Headless view that records calls and tracks selection and expansion
#[derive(Debug, Default)]
pub struct RecordingView {
    calls: RefCell<Vec<ViewCall>>,
    roots: RefCell<Vec<NodeId>>,
    selected: Cell<Option<NodeId>>,
    expanded: RefCell<HashSet<NodeId>>,
}

impl RecordingView {
    /// Creates an empty view
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the user selecting a row, without recording a call
    pub fn set_selected(&self, node: Option<NodeId>) {
        self.selected.set(node);
    }

    /// All calls recorded so far
    #[must_use]
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }

    /// Drains the recorded calls
    pub fn take_calls(&self) -> Vec<ViewCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Only the refresh calls, drained
    pub fn take_refreshes(&self) -> Vec<ViewCall> {
        self.take_calls()
            .into_iter()
            .filter(ViewCall::is_refresh)
            .collect()
    }

    /// Displayed roots
    #[must_use]
    pub fn roots(&self) -> Vec<NodeId> {
        self.roots.borrow().clone()
    }

    /// Returns true if the row was expanded through the view
    #[must_use]
    pub fn is_expanded(&self, node: NodeId) -> bool {
        self.expanded.borrow().contains(&node)
    }

    fn record(&self, call: ViewCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl TreeView for RecordingView {
    fn set_roots(&self, roots: &[NodeId]) {
        *self.roots.borrow_mut() = roots.to_vec();
        self.record(ViewCall::SetRoots(roots.to_vec()));
    }

    fn refresh_one(&self, node: NodeId) {
        self.record(ViewCall::RefreshOne(node));
    }

    fn refresh_many(&self, nodes: &[NodeId]) {
        self.record(ViewCall::RefreshMany(nodes.to_vec()));
    }

    fn expand(&self, node: NodeId) {
        self.expanded.borrow_mut().insert(node);
        self.record(ViewCall::Expand(node));
    }

    fn select(&self, node: NodeId) {
        self.selected.set(Some(node));
        self.record(ViewCall::Select(node));
    }

    fn scroll_into_view(&self, node: NodeId) {
        self.record(ViewCall::ScrollIntoView(node));
    }

    fn selected(&self) -> Option<NodeId> {
        self.selected.get()
    }

    fn begin_edit(&self, node: NodeId) {
        self.record(ViewCall::BeginEdit(node));
    }

    fn rebuild_all(&self, preserve_state: bool) {
        if !preserve_state {
            self.expanded.borrow_mut().clear();
            self.selected.set(None);
        }
        self.record(ViewCall::RebuildAll { preserve_state });
    }
}
