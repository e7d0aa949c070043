// quicklink-core: entry model, link reconciliation, and list controller between quicklink-api and the CLI.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod convert;
pub mod draft;
pub mod editor;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod status;
mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{CapabilityResolver, EntryStore, HassBackend};
pub use catalog::LinkDescriptor;
pub use config::{ConnectionConfig, TlsVerification};
pub use controller::{EntryListController, Notification, StoreOperation};
pub use draft::{ApplyOutcome, Draft, DraftId, LinkEdit, ResolutionState};
pub use editor::Editor;
pub use error::CoreError;
pub use reconcile::{Reconciler, Resolution, ResolveOutcome, ResolveRequest};
pub use status::InstanceStatus;
pub use stream::EntryStream;

pub use model::{Entry, EntryId, Link, LinkType, Target, TargetRole, TargetSelection};
