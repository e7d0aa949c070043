// ── Entry list controller ──
//
// Owns the cached list of persisted entries and runs list-level
// actions against the entry store. Every successful mutation is
// followed by a full re-fetch; failures leave the cache untouched and
// are broadcast as notifications.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::backend::EntryStore;
use crate::draft::Draft;
use crate::error::CoreError;
use crate::model::{Entry, EntryId};
use crate::store::EntryCache;
use crate::stream::EntryStream;

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

// ── Notification ─────────────────────────────────────────────────

/// Store-facing action, for failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StoreOperation {
    Refresh,
    Toggle,
    Remove,
    Save,
}

/// Events a front end may want to surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The cache was replaced with `count` entries.
    Refreshed { count: usize },
    /// A store call failed; the cache was left as it was.
    /// `retryable` is set when Home Assistant could not be reached.
    StoreFailed {
        operation: StoreOperation,
        message: String,
        retryable: bool,
    },
}

// ── EntryListController ──────────────────────────────────────────

/// Cheaply cloneable via `Arc<ControllerInner>`.
pub struct EntryListController<S: EntryStore> {
    inner: Arc<ControllerInner<S>>,
}

struct ControllerInner<S> {
    store: S,
    cache: EntryCache,
    notifications: broadcast::Sender<Notification>,
}

impl<S: EntryStore> Clone for EntryListController<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: EntryStore> EntryListController<S> {
    /// Create a controller with an empty cache. Call
    /// [`refresh()`](Self::refresh) to load entries.
    pub fn new(store: S) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self {
            inner: Arc::new(ControllerInner {
                store,
                cache: EntryCache::new(),
                notifications,
            }),
        }
    }

    pub fn store(&self) -> &S {
        &self.inner.store
    }

    // ── Cache access ─────────────────────────────────────────────

    /// The cached entries in store order.
    pub fn list(&self) -> Arc<Vec<Arc<Entry>>> {
        self.inner.cache.snapshot()
    }

    pub fn get(&self, entry_id: &EntryId) -> Option<Arc<Entry>> {
        self.inner.cache.get(entry_id)
    }

    pub fn subscribe(&self) -> EntryStream {
        EntryStream::new(self.inner.cache.subscribe())
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifications.subscribe()
    }

    /// Time of the last successful refresh.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.cache.last_refresh()
    }

    // ── Editing hand-off ─────────────────────────────────────────

    pub fn begin_new(&self) -> Draft {
        Draft::begin_new()
    }

    /// Open a draft on a copy of a cached entry.
    pub fn begin_edit(&self, entry_id: &EntryId) -> Result<Draft, CoreError> {
        let entry = self.require(entry_id)?;
        Ok(Draft::begin_edit(&entry))
    }

    // ── Store actions ────────────────────────────────────────────

    /// Re-fetch the full list. Returns the number of entries.
    pub async fn refresh(&self) -> Result<usize, CoreError> {
        let entries = self
            .inner
            .store
            .list_entries()
            .await
            .map_err(|e| self.report(StoreOperation::Refresh, e))?;

        let count = entries.len();
        self.inner.cache.replace(entries);
        info!(count, "entry list refreshed");
        let _ = self
            .inner
            .notifications
            .send(Notification::Refreshed { count });
        Ok(count)
    }

    /// Flip an entry's enabled flag based on the cached value. Returns
    /// the value sent to the store.
    pub async fn toggle_enabled(&self, entry_id: &EntryId) -> Result<bool, CoreError> {
        let enabled = !self.require(entry_id)?.enabled;
        debug!(%entry_id, enabled, "toggling entry");

        self.inner
            .store
            .set_enabled(entry_id, enabled)
            .await
            .map_err(|e| self.report(StoreOperation::Toggle, e))?;

        self.refresh().await?;
        Ok(enabled)
    }

    pub async fn remove(&self, entry_id: &EntryId) -> Result<(), CoreError> {
        debug!(%entry_id, "removing entry");
        self.inner
            .store
            .remove_entry(entry_id)
            .await
            .map_err(|e| self.report(StoreOperation::Remove, e))?;

        self.refresh().await?;
        Ok(())
    }

    /// Save a draft: create when it has no `entry_id`, update otherwise.
    ///
    /// A draft that is not save-able is refused before the store is
    /// contacted.
    pub async fn persist(&self, draft: &Draft) -> Result<(), CoreError> {
        let entry = draft.to_persistable()?;
        debug!(
            entry_id = entry.entry_id.as_ref().map_or("<new>", EntryId::as_str),
            links = entry.links.len(),
            "persisting entry"
        );

        self.inner
            .store
            .save_entry(&entry)
            .await
            .map_err(|e| self.report(StoreOperation::Save, e))?;

        self.refresh().await?;
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn require(&self, entry_id: &EntryId) -> Result<Arc<Entry>, CoreError> {
        self.inner
            .cache
            .get(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound {
                entry_id: entry_id.to_string(),
            })
    }

    fn report(&self, operation: StoreOperation, error: CoreError) -> CoreError {
        let retryable = error.is_connectivity();
        warn!(%operation, error = %error, retryable, "store request failed");
        let _ = self.inner.notifications.send(Notification::StoreFailed {
            operation,
            message: error.to_string(),
            retryable,
        });
        error
    }
}
