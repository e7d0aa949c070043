// ── Reactive entry stream ──
//
// Subscription type for consuming entry list changes from the controller.

use std::sync::Arc;

use tokio::sync::watch;

use crate::model::Entry;

/// A subscription to the cached entry list.
///
/// Provides both point-in-time snapshot access and change notification
/// via [`changed()`](Self::changed).
pub struct EntryStream {
    current: Arc<Vec<Arc<Entry>>>,
    receiver: watch::Receiver<Arc<Vec<Arc<Entry>>>>,
}

impl EntryStream {
    pub(crate) fn new(receiver: watch::Receiver<Arc<Vec<Arc<Entry>>>>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &Arc<Vec<Arc<Entry>>> {
        &self.current
    }

    /// Latest snapshot, possibly newer than `current()`.
    pub fn latest(&self) -> Arc<Vec<Arc<Entry>>> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next refresh. `None` once the controller is gone.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Arc<Entry>>>> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }
}
