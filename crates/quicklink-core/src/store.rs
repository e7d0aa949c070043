// ── Entry cache ──
//
// Snapshot of the persisted entries with push-based change notification
// via `watch` channels. The snapshot is replaced as a whole on every
// refresh and never mutated in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::model::{Entry, EntryId};

pub(crate) type EntrySnapshot = Arc<Vec<Arc<Entry>>>;

pub(crate) struct EntryCache {
    snapshot: watch::Sender<EntrySnapshot>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl EntryCache {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);
        Self {
            snapshot,
            last_refresh,
        }
    }

    /// Swap in a freshly fetched list and stamp the refresh time.
    pub(crate) fn replace(&self, entries: Vec<Entry>) {
        let values: Vec<Arc<Entry>> = entries.into_iter().map(Arc::new).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
        self.last_refresh.send_modify(|t| *t = Some(Utc::now()));
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> EntrySnapshot {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn get(&self, entry_id: &EntryId) -> Option<Arc<Entry>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|e| e.entry_id.as_ref() == Some(entry_id))
            .cloned()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<EntrySnapshot> {
        self.snapshot.subscribe()
    }

    pub(crate) fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}
