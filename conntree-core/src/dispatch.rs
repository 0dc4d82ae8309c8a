//! Marshaling of requests from other threads onto the UI thread.
//!
//! Expanding a node and rebuilding the view are the only operations other
//! threads may request. They are queued here and executed when the UI thread
//! calls [`ConnectionTree::process_ui_requests`](crate::ConnectionTree::process_ui_requests).

use tokio::sync::mpsc;
use tracing::warn;

use crate::models::NodeId;

/// A request queued for the UI thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiRequest {
    /// Expand a container row
    Expand(NodeId),
    /// Rebuild every row
    RebuildAll {
        /// Keep expansion and selection
        preserve_state: bool,
    },
}

/// Thread-safe sender of [`UiRequest`]s
#[derive(Debug, Clone)]
pub struct UiHandle {
    tx: mpsc::UnboundedSender<UiRequest>,
}

impl UiHandle {
    /// Requests that a node be expanded
    pub fn invoke_expand(&self, node: NodeId) {
        self.send(UiRequest::Expand(node));
    }

    /// Requests a full rebuild of the view
    pub fn invoke_rebuild_all(&self, preserve_state: bool) {
        self.send(UiRequest::RebuildAll { preserve_state });
    }

    fn send(&self, request: UiRequest) {
        if self.tx.send(request).is_err() {
            warn!(?request, "UI thread is gone, request dropped");
        }
    }
}

/// UI-thread side of the queue
#[derive(Debug)]
pub struct UiQueue {
    tx: mpsc::UnboundedSender<UiRequest>,
    rx: mpsc::UnboundedReceiver<UiRequest>,
}

impl Default for UiQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl UiQueue {
    /// Creates an empty queue
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Returns a new sender for other threads
    #[must_use]
    pub fn handle(&self) -> UiHandle {
        UiHandle {
            tx: self.tx.clone(),
        }
    }

    /// Takes every request queued so far, in arrival order
    pub fn drain(&mut self) -> Vec<UiRequest> {
        let mut requests = Vec::new();
        while let Ok(request) = self.rx.try_recv() {
            requests.push(request);
        }
        requests
    }
}
