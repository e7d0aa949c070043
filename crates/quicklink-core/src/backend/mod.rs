// ── Remote collaborators ──
//
// The entry store and the capability resolver are external services.
// Controllers and the reconciler are generic over these traits; the
// Home Assistant implementation lives in `hass`.

pub(crate) mod hass;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{Entry, EntryId, Target};
use crate::reconcile::Resolution;

pub use hass::HassBackend;

/// Persistent storage of entries.
pub trait EntryStore: Send + Sync + 'static {
    fn list_entries(&self) -> impl Future<Output = Result<Vec<Entry>, CoreError>> + Send;

    fn remove_entry(&self, entry_id: &EntryId)
    -> impl Future<Output = Result<(), CoreError>> + Send;

    fn set_enabled(
        &self,
        entry_id: &EntryId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Create the entry when `entry_id` is `None`, update it otherwise.
    fn save_entry(&self, entry: &Entry) -> impl Future<Output = Result<(), CoreError>> + Send;
}

/// Computes which links are possible between two targets.
pub trait CapabilityResolver: Send + Sync + 'static {
    fn resolve(
        &self,
        source: &Target,
        destination: &Target,
    ) -> impl Future<Output = Result<Resolution, CoreError>> + Send;
}
