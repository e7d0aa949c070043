// ── Domain model ──
//
// Canonical types for entries, their links, and link endpoints.
// Wire shapes live in `quicklink_api::models`; see `crate::convert`.

pub mod entry;
pub mod link;
pub mod target;

pub use entry::{Entry, EntryId};
pub use link::{Link, LinkType};
pub use target::{Target, TargetRole, TargetSelection};
