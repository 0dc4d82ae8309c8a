//! Token-based handler registries for change notifications.
//!
//! Handlers are held behind `Rc` and identified by a [`SubscriptionToken`].
//! Dropping a token from the registry stops delivery immediately, including
//! for a dispatch that is already in progress.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Handle identifying one registered handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(u64);

impl SubscriptionToken {
    fn next() -> Self {
        Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

type Handler<E> = Rc<dyn Fn(&E)>;

/// Ordered list of handlers for events of type `E`
pub struct Subscribers<E> {
    handlers: RefCell<Vec<(SubscriptionToken, Handler<E>)>>,
}

impl<E> Default for Subscribers<E> {
    fn default() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
        }
    }
}

impl<E> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("count", &self.len())
            .finish()
    }
}

impl<E> Subscribers<E> {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler and returns its token
    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> SubscriptionToken {
        let token = SubscriptionToken::next();
        self.handlers.borrow_mut().push((token, Rc::new(handler)));
        token
    }

    /// Removes a handler; returns false if the token was not registered here
    pub fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(t, _)| *t != token);
        handlers.len() != before
    }

    /// Returns true if the token is still registered
    #[must_use]
    pub fn contains(&self, token: SubscriptionToken) -> bool {
        self.handlers.borrow().iter().any(|(t, _)| *t == token)
    }

    /// Number of registered handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Returns true if no handler is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers an event to every registered handler in subscription order
    ///
    /// Handlers may subscribe or unsubscribe while the event is delivered.
    /// Handlers removed during delivery are skipped.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<(SubscriptionToken, Handler<E>)> = self.handlers.borrow().clone();
        for (token, handler) in snapshot {
            if self.contains(token) {
                handler(event);
            }
        }
    }
}
