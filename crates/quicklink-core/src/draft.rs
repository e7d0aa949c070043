// ── Entry draft model ──
//
// The mutable, in-memory entry under edit. All editing invariants live
// here: targets are replaced wholesale, link edits touch exactly one
// field of one link, and resolver responses are merged only when they
// belong to the draft's current target pair.

use std::fmt;

use tracing::debug;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{Entry, EntryId, Link, LinkType, Target, TargetRole};
use crate::reconcile::{ResolveOutcome, ResolveRequest};

// ── DraftId ─────────────────────────────────────────────────────────

/// Identity token of one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftId(Uuid);

impl DraftId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── ResolutionState ─────────────────────────────────────────────────

/// Where the draft's link list stands relative to its current targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// New draft; nothing has been resolved yet.
    Unresolved,
    /// A request for the current targets is outstanding.
    Resolving { generation: u64 },
    /// Links match the current targets.
    Resolved,
    /// The last resolution failed, or the targets changed after the
    /// links were resolved.
    Stale,
}

// ── LinkEdit ────────────────────────────────────────────────────────

/// A single-field change to one link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEdit {
    Enabled(bool),
    Reverse(bool),
    /// Must be one of the link's `triggers`, or `None` to clear.
    Trigger(Option<String>),
    Extra(Option<String>),
}

/// Result of merging a resolver outcome into a draft.
#[derive(Debug)]
pub enum ApplyOutcome {
    /// Title and links were replaced.
    Applied,
    /// The resolver failed; the draft is now stale and keeps its data.
    Failed(CoreError),
    /// The outcome belonged to another draft or an older request.
    Discarded,
}

// ── Draft ───────────────────────────────────────────────────────────

/// An entry being created or edited.
#[derive(Debug, Clone)]
pub struct Draft {
    id: DraftId,
    generation: u64,
    state: ResolutionState,
    entry_id: Option<EntryId>,
    title: String,
    enabled: bool,
    source: Target,
    destination: Target,
    links: Vec<Link>,
}

impl Draft {
    /// Start a new, empty, enabled entry.
    pub fn begin_new() -> Self {
        Self {
            id: DraftId::new(),
            generation: 0,
            state: ResolutionState::Unresolved,
            entry_id: None,
            title: String::new(),
            enabled: true,
            source: Target::Unset,
            destination: Target::Unset,
            links: Vec::new(),
        }
    }

    /// Start editing a copy of a persisted entry. The original is never
    /// touched by later edits.
    pub fn begin_edit(entry: &Entry) -> Self {
        let entry = entry.clone();
        Self {
            id: DraftId::new(),
            generation: 0,
            state: ResolutionState::Resolved,
            entry_id: entry.entry_id,
            title: entry.title,
            enabled: entry.enabled,
            source: entry.source,
            destination: entry.destination,
            links: entry.links,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn id(&self) -> DraftId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    pub fn is_resolving(&self) -> bool {
        matches!(self.state, ResolutionState::Resolving { .. })
    }

    pub fn entry_id(&self) -> Option<&EntryId> {
        self.entry_id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn source(&self) -> &Target {
        &self.source
    }

    pub fn destination(&self) -> &Target {
        &self.destination
    }

    pub fn target(&self, role: TargetRole) -> &Target {
        match role {
            TargetRole::Source => &self.source,
            TargetRole::Destination => &self.destination,
        }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Position of the link of the given type, if the resolver offered one.
    pub fn link_index(&self, link_type: LinkType) -> Option<usize> {
        self.links.iter().position(|l| l.link_type == link_type)
    }

    // ── Mutators ─────────────────────────────────────────────────────

    /// Set the title verbatim.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Replace one target.
    ///
    /// Returns a resolve request whenever both targets are set
    /// afterwards, even if the value did not change. Any request issued
    /// earlier is superseded.
    pub fn set_target(&mut self, role: TargetRole, target: Target) -> Option<ResolveRequest> {
        match role {
            TargetRole::Source => self.source = target,
            TargetRole::Destination => self.destination = target,
        }
        self.generation += 1;

        if self.source.is_set() && self.destination.is_set() {
            self.state = ResolutionState::Resolving {
                generation: self.generation,
            };
            debug!(draft = %self.id, generation = self.generation, "requesting link resolution");
            Some(ResolveRequest {
                draft: self.id,
                generation: self.generation,
                source: self.source.clone(),
                destination: self.destination.clone(),
            })
        } else {
            self.state = if self.links.is_empty() {
                ResolutionState::Unresolved
            } else {
                ResolutionState::Stale
            };
            None
        }
    }

    /// Change one field of the link at `index`.
    ///
    /// Invalid edits leave the draft unchanged.
    pub fn set_link_field(&mut self, index: usize, edit: LinkEdit) -> Result<(), CoreError> {
        let len = self.links.len();
        let link = self
            .links
            .get_mut(index)
            .ok_or(CoreError::LinkIndexOutOfRange { index, len })?;

        match edit {
            LinkEdit::Enabled(enabled) => link.enabled = enabled,
            LinkEdit::Reverse(reverse) => link.reverse = Some(reverse),
            LinkEdit::Trigger(Some(trigger)) => {
                if !link.triggers.contains(&trigger) {
                    return Err(CoreError::ValidationFailed {
                        message: if link.triggers.is_empty() {
                            format!("{} link has no trigger options", link.link_type)
                        } else {
                            format!(
                                "'{trigger}' is not a trigger of the {} link (options: {})",
                                link.link_type,
                                link.triggers.join(", ")
                            )
                        },
                    });
                }
                link.trigger = Some(trigger);
            }
            LinkEdit::Trigger(None) => link.trigger = None,
            LinkEdit::Extra(extra) => link.extra = extra,
        }
        Ok(())
    }

    // ── Saving ───────────────────────────────────────────────────────

    /// Why the draft cannot be saved right now, if anything.
    pub fn save_blocker(&self) -> Option<&'static str> {
        if self.title.trim().is_empty() {
            Some("title is empty")
        } else if !self.source.is_set() {
            Some("source is not set")
        } else if !self.destination.is_set() {
            Some("destination is not set")
        } else if self.links.is_empty() {
            Some("no links are available for these targets")
        } else {
            match self.state {
                ResolutionState::Resolving { .. } => Some("link resolution is still in progress"),
                ResolutionState::Stale => Some("links are out of date for the selected targets"),
                ResolutionState::Unresolved | ResolutionState::Resolved => None,
            }
        }
    }

    pub fn is_saveable(&self) -> bool {
        self.save_blocker().is_none()
    }

    /// The entry to hand to the store.
    pub fn to_persistable(&self) -> Result<Entry, CoreError> {
        if let Some(reason) = self.save_blocker() {
            return Err(CoreError::NotSaveable {
                reason: reason.to_owned(),
            });
        }
        Ok(Entry {
            entry_id: self.entry_id.clone(),
            title: self.title.clone(),
            enabled: self.enabled,
            source: self.source.clone(),
            destination: self.destination.clone(),
            links: self.links.clone(),
        })
    }

    // ── Reconciliation ───────────────────────────────────────────────

    /// Merge a resolver outcome.
    ///
    /// Outcomes for another draft or for a superseded request are
    /// discarded. A success replaces title and links wholesale; a
    /// failure keeps them and marks the draft stale.
    pub fn apply(&mut self, outcome: ResolveOutcome) -> ApplyOutcome {
        if outcome.draft != self.id || outcome.generation != self.generation {
            debug!(
                draft = %self.id,
                current = self.generation,
                received = outcome.generation,
                "discarding outdated resolution"
            );
            return ApplyOutcome::Discarded;
        }

        match outcome.result {
            Ok(resolution) => {
                self.title = resolution.title;
                self.links = resolution.links;
                self.state = ResolutionState::Resolved;
                ApplyOutcome::Applied
            }
            Err(e) => {
                self.state = ResolutionState::Stale;
                ApplyOutcome::Failed(e)
            }
        }
    }
}
