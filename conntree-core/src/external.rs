//! Change feed of the external session discovery.
//!
//! The discovery component owns the external-session roots. The tree only
//! needs to know *that* something changed; it then redraws every external
//! root it displays.

use std::rc::Rc;

use tracing::debug;

use crate::subscription::{Subscribers, SubscriptionToken};

/// A change feed without payload
pub trait ExternalFeed {
    /// Registers a handler called on every change
    fn subscribe(&self, handler: Rc<dyn Fn()>) -> SubscriptionToken;

    /// Removes a handler; returns false if it was not registered
    fn unsubscribe(&self, token: SubscriptionToken) -> bool;
}

/// In-process feed the discovery component notifies after each scan
#[derive(Debug, Default)]
pub struct SessionFeed {
    subscribers: Subscribers<()>,
}

impl SessionFeed {
    /// Creates a feed with no subscribers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifies every subscriber that the discovered sessions changed
    pub fn notify_changed(&self) {
        debug!(subscribers = self.subscribers.len(), "External sessions changed");
        self.subscribers.emit(&());
    }

    /// Number of registered handlers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl ExternalFeed for SessionFeed {
    fn subscribe(&self, handler: Rc<dyn Fn()>) -> SubscriptionToken {
        self.subscribers.subscribe(move |()| handler())
    }

    fn unsubscribe(&self, token: SubscriptionToken) -> bool {
        self.subscribers.unsubscribe(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_notify_reaches_subscribers() {
        let feed = SessionFeed::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let token = feed.subscribe(Rc::new(move || h.set(h.get() + 1)));

        feed.notify_changed();
        feed.notify_changed();
        assert!(feed.unsubscribe(token));
        feed.notify_changed();

        assert_eq!(hits.get(), 2);
        assert_eq!(feed.subscriber_count(), 0);
    }
}
