//! Connection tree view binding
//!
//! [`ConnectionTree`] binds one [`ModelHandle`] at a time to a [`TreeView`].
//! It owns the model subscriptions, turns model notifications into refresh
//! calls, bridges the external session feed and exposes the node commands
//! and gesture handlers of the tree control.
//!
//! ## Lifecycle
//!
//! The binding starts unbound. The first [`ConnectionTree::attach`] binds a
//! model and activates the external feed bridge; every later attach detaches
//! the previous model's subscriptions before subscribing to the new one.
//! There is no way back to the unbound state.

mod commands;
mod interaction;
mod post_attach;

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, instrument, warn};

use crate::dispatch::{UiHandle, UiQueue, UiRequest};
use crate::error::{TreeError, TreeResult};
use crate::external::ExternalFeed;
use crate::models::{DefaultTemplates, NodeDefaults, NodeId, TreeNode};
use crate::persistence::{NoOpSaver, SaveRequester};
use crate::search::{NodeSearcher, SearchResult};
use crate::subscription::SubscriptionToken;
use crate::translator::{translate, translate_property};
use crate::tree::{ModelHandle, ModelSlot};
use crate::view::TreeView;

pub use interaction::{CellClick, ClickAction, ClickHandlerChain, SelectionListener};
pub use post_attach::{ExpandRootNode, PostAttachAction, RestoreExpandedContainers, SelectRootNode};

/// Predicate asked before a node is deleted
pub type DeletionConfirmer = Box<dyn Fn(&TreeNode) -> bool>;

/// View binding and interaction coordinator of the connection tree
pub struct ConnectionTree {
    view: Rc<dyn TreeView>,
    slot: ModelSlot,
    model_tokens: RefCell<Vec<SubscriptionToken>>,
    feed: Option<Rc<dyn ExternalFeed>>,
    feed_token: Cell<Option<SubscriptionToken>>,
    searcher: RefCell<NodeSearcher>,
    post_attach: Vec<Box<dyn PostAttachAction>>,
    running_post_attach: Cell<bool>,
    confirm_delete: DeletionConfirmer,
    single_click: ClickHandlerChain,
    double_click: ClickHandlerChain,
    selection_listener: Option<SelectionListener>,
    defaults: Rc<dyn DefaultTemplates>,
    saver: Rc<dyn SaveRequester>,
    ui_queue: RefCell<UiQueue>,
    save_on_rename_commit: bool,
}

impl std::fmt::Debug for ConnectionTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionTree")
            .field("bound", &self.slot.is_bound())
            .field("model_subscriptions", &self.model_tokens.borrow().len())
            .field("feed_bridged", &self.feed_token.get().is_some())
            .field("post_attach_actions", &self.post_attach.len())
            .field("save_on_rename_commit", &self.save_on_rename_commit)
            .finish_non_exhaustive()
    }
}

impl ConnectionTree {
    /// Creates an unbound tree rendering into `view`
    ///
    /// Deletions are confirmed automatically, new nodes get empty defaults
    /// and save requests are ignored until the matching `with_*` method
    /// replaces them.
    #[must_use]
    pub fn new(view: Rc<dyn TreeView>) -> Self {
        Self {
            view,
            slot: ModelSlot::new(),
            model_tokens: RefCell::new(Vec::new()),
            feed: None,
            feed_token: Cell::new(None),
            searcher: RefCell::new(NodeSearcher::default()),
            post_attach: Vec::new(),
            running_post_attach: Cell::new(false),
            confirm_delete: Box::new(|_| true),
            single_click: ClickHandlerChain::new(),
            double_click: ClickHandlerChain::new(),
            selection_listener: None,
            defaults: Rc::new(NodeDefaults::default()),
            saver: Rc::new(NoOpSaver),
            ui_queue: RefCell::new(UiQueue::new()),
            save_on_rename_commit: false,
        }
    }

    /// Sets the external session feed bridged on first attach
    #[must_use]
    pub fn with_external_feed(mut self, feed: Rc<dyn ExternalFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Sets the default templates applied to new nodes
    #[must_use]
    pub fn with_defaults(mut self, defaults: Rc<dyn DefaultTemplates>) -> Self {
        self.defaults = defaults;
        self
    }

    /// Sets the persistence collaborator
    #[must_use]
    pub fn with_saver(mut self, saver: Rc<dyn SaveRequester>) -> Self {
        self.saver = saver;
        self
    }

    /// Sets the deletion confirmation predicate
    #[must_use]
    pub fn with_deletion_confirmer(mut self, confirm: impl Fn(&TreeNode) -> bool + 'static) -> Self {
        self.confirm_delete = Box::new(confirm);
        self
    }

    /// Appends an action run once after every attach
    #[must_use]
    pub fn with_post_attach_action(mut self, action: impl PostAttachAction + 'static) -> Self {
        self.post_attach.push(Box::new(action));
        self
    }

    /// Appends a handler to the single-click chain
    #[must_use]
    pub fn with_single_click(mut self, action: impl ClickAction + 'static) -> Self {
        self.single_click.push(action);
        self
    }

    /// Appends a handler to the double-click chain
    #[must_use]
    pub fn with_double_click(mut self, action: impl ClickAction + 'static) -> Self {
        self.double_click.push(action);
        self
    }

    /// Sets the listener told about every selection change
    #[must_use]
    pub fn with_selection_listener(
        mut self,
        listener: impl Fn(Option<&TreeNode>) -> TreeResult<()> + 'static,
    ) -> Self {
        self.selection_listener = Some(Box::new(listener));
        self
    }

    /// Also save when an inline rename is committed
    #[must_use]
    pub const fn with_save_on_rename_commit(mut self, enabled: bool) -> Self {
        self.save_on_rename_commit = enabled;
        self
    }

    // ========== Binding ==========

    /// Binds a model, replacing the previous one
    ///
    /// Detaches the previous model, publishes the new root set, subscribes to
    /// the new model, bridges the external feed on first use, rebuilds the
    /// search index and runs every post-attach action once, in order.
    ///
    /// # Errors
    ///
    /// Returns `TreeError::ReentrantAttach` when called from a post-attach
    /// action; the current binding is left untouched.
    #[instrument(skip_all)]
    pub fn attach(&self, model: ModelHandle) -> TreeResult<()> {
        if self.running_post_attach.get() {
            warn!("Attach requested from a post-attach action, ignoring");
            return Err(TreeError::ReentrantAttach);
        }

        self.detach_model();

        let roots = model.read().roots().to_vec();
        self.view.set_roots(&roots);

        let view = Rc::clone(&self.view);
        let collection =
            model.subscribe_collection(move |change| translate(change).apply(&*view));
        let view = Rc::clone(&self.view);
        let property =
            model.subscribe_property(move |change| translate_property(change).apply(&*view));
        *self.model_tokens.borrow_mut() = vec![collection, property];

        self.bridge_external_feed();

        *self.searcher.borrow_mut() = NodeSearcher::new(&model);
        debug!(
            roots = roots.len(),
            nodes = self.searcher.borrow().len(),
            "Model attached"
        );
        self.slot.replace(model);

        self.run_post_attach_actions();
        Ok(())
    }

    /// Returns true once a model has been attached
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.slot.is_bound()
    }

    /// The bound model
    ///
    /// # Errors
    ///
    /// Returns `TreeError::Unbound` before the first attach.
    pub fn model(&self) -> TreeResult<ModelHandle> {
        self.slot.get().ok_or(TreeError::Unbound)
    }

    /// Slot following the bound model, for collaborators such as the saver
    #[must_use]
    pub fn model_slot(&self) -> ModelSlot {
        self.slot.clone()
    }

    fn detach_model(&self) {
        let tokens = std::mem::take(&mut *self.model_tokens.borrow_mut());
        if let Some(previous) = self.slot.get() {
            for token in tokens {
                previous.unsubscribe(token);
            }
            debug!("Previous model detached");
        }
    }

    fn bridge_external_feed(&self) {
        let Some(feed) = &self.feed else {
            return;
        };
        if self.feed_token.get().is_some() {
            return;
        }
        let slot = self.slot.clone();
        let view = Rc::clone(&self.view);
        let token = feed.subscribe(Rc::new(move || {
            let Some(model) = slot.get() else {
                return;
            };
            let roots = model.read().external_roots();
            debug!(roots = roots.len(), "Refreshing external session roots");
            view.refresh_many(&roots);
        }));
        self.feed_token.set(Some(token));
    }

    fn run_post_attach_actions(&self) {
        let _running = RunningFlag::raise(&self.running_post_attach);
        for action in &self.post_attach {
            if let Err(e) = action.run(self) {
                warn!(action = action.name(), error = %e, "Post-attach action failed");
            }
        }
    }

    // ========== Queries ==========

    /// The widget this tree renders into
    #[must_use]
    pub fn view(&self) -> &dyn TreeView {
        self.view.as_ref()
    }

    /// Node under the widget's selection
    #[must_use]
    pub fn selected_node(&self) -> Option<TreeNode> {
        let id = self.view.selected()?;
        self.slot.get()?.node(id)
    }

    /// The permanent root of the bound model
    #[must_use]
    pub fn root_connection_node(&self) -> Option<TreeNode> {
        let model = self.slot.get()?;
        let root = model.read().root_id();
        model.node(root)
    }

    /// External-session roots of the bound model, in display order
    #[must_use]
    pub fn external_root_nodes(&self) -> Vec<TreeNode> {
        let Some(model) = self.slot.get() else {
            return Vec::new();
        };
        let model = model.read();
        model
            .external_roots()
            .into_iter()
            .filter_map(|id| model.node(id).cloned())
            .collect()
    }

    /// Searcher bound at the last attach
    #[must_use]
    pub fn node_searcher(&self) -> Ref<'_, NodeSearcher> {
        self.searcher.borrow()
    }

    // ========== Search ==========

    /// Finds nodes whose name contains `text` and selects the first match
    pub fn search(&self, text: &str) -> Vec<NodeId> {
        let matches = self.searcher.borrow_mut().search_by_name(text).to_vec();
        if let Some(first) = matches.first() {
            self.reveal(*first);
        }
        matches
    }

    /// Finds nodes whose name matches a regular expression and selects the
    /// first match
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern does not compile.
    pub fn search_pattern(&self, pattern: &str) -> SearchResult<Vec<NodeId>> {
        let matches = self.searcher.borrow_mut().search_pattern(pattern)?.to_vec();
        if let Some(first) = matches.first() {
            self.reveal(*first);
        }
        Ok(matches)
    }

    /// Selects the next match of the last search
    pub fn select_next_match(&self) -> Option<NodeId> {
        let next = self.searcher.borrow_mut().next_match()?;
        self.reveal(next);
        Some(next)
    }

    /// Selects the previous match of the last search
    pub fn select_previous_match(&self) -> Option<NodeId> {
        let previous = self.searcher.borrow_mut().previous_match()?;
        self.reveal(previous);
        Some(previous)
    }

    fn reveal(&self, node: NodeId) {
        self.view.select(node);
        self.view.scroll_into_view(node);
    }

    // ========== Cross-thread requests ==========

    /// Sender other threads use to request an expand or a rebuild
    #[must_use]
    pub fn ui_handle(&self) -> UiHandle {
        self.ui_queue.borrow().handle()
    }

    /// Executes the requests queued by [`UiHandle`]s; returns how many ran
    pub fn process_ui_requests(&self) -> usize {
        let requests = self.ui_queue.borrow_mut().drain();
        for request in &requests {
            match *request {
                UiRequest::Expand(node) => self.view.expand(node),
                UiRequest::RebuildAll { preserve_state } => self.view.rebuild_all(preserve_state),
            }
        }
        requests.len()
    }
}

/// Holds a flag raised until dropped, including during unwinding
struct RunningFlag<'a>(&'a Cell<bool>);

impl<'a> RunningFlag<'a> {
    fn raise(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for RunningFlag<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Drop for ConnectionTree {
    fn drop(&mut self) {
        self.detach_model();
        if let (Some(feed), Some(token)) = (&self.feed, self.feed_token.take()) {
            feed.unsubscribe(token);
        }
    }
}
