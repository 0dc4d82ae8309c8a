//! Fire-and-forget persistence of the bound model.
//!
//! Commands only *request* a save. [`SnapshotSaver`] captures the bound model
//! on the UI thread and hands the snapshot to [`run_save_worker`], a tokio
//! task that writes it to disk. The outcome never reaches the caller.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::config::ConfigManager;
use crate::tree::{ModelSlot, TreeSnapshot};

/// Receiver of save requests
pub trait SaveRequester {
    /// Requests an asynchronous save; never blocks and never fails
    fn save_async(&self);
}

/// Ignores every save request
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSaver;

impl SaveRequester for NoOpSaver {
    fn save_async(&self) {}
}

/// Sends a snapshot of the bound model to the save worker
#[derive(Debug, Clone)]
pub struct SnapshotSaver {
    slot: ModelSlot,
    tx: mpsc::UnboundedSender<TreeSnapshot>,
}

impl SnapshotSaver {
    /// Creates a saver following the model bound in `slot`
    #[must_use]
    pub const fn new(slot: ModelSlot, tx: mpsc::UnboundedSender<TreeSnapshot>) -> Self {
        Self { slot, tx }
    }
}

impl SaveRequester for SnapshotSaver {
    fn save_async(&self) {
        let Some(model) = self.slot.get() else {
            debug!("Save requested with no model bound");
            return;
        };
        let snapshot = model.read().snapshot();
        if self.tx.send(snapshot).is_err() {
            warn!("Save worker has stopped, save request dropped");
        }
    }
}

/// Writes snapshots until every sender is dropped
///
/// Snapshots queued while a write is in progress are coalesced; only the
/// newest one is written.
pub async fn run_save_worker(mut rx: mpsc::UnboundedReceiver<TreeSnapshot>, config: ConfigManager) {
    while let Some(mut snapshot) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            snapshot = newer;
        }
        let config = config.clone();
        match tokio::task::spawn_blocking(move || config.save_tree(&snapshot)).await {
            Ok(Ok(())) => debug!("Connection tree saved"),
            Ok(Err(e)) => error!(error = %e, "Failed to save connection tree"),
            Err(e) => error!(error = %e, "Save task panicked"),
        }
    }
    debug!("Save worker stopped");
}

/// Spawns [`run_save_worker`] on the current tokio runtime
///
/// Returns the sender for [`SnapshotSaver::new`] and the worker's join handle,
/// which completes once every sender is dropped.
#[must_use]
pub fn spawn_save_worker(
    config: ConfigManager,
) -> (mpsc::UnboundedSender<TreeSnapshot>, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_save_worker(rx, config));
    (tx, handle)
}
