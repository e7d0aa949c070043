// ── Editing session ──
//
// Pairs the open draft with a reconciler: target changes dispatch
// resolve requests automatically, outcomes are merged in arrival order,
// and closing the session turns anything still in flight into a no-op.

use std::time::Duration;

use tracing::debug;

use crate::backend::CapabilityResolver;
use crate::draft::{ApplyOutcome, Draft, LinkEdit, ResolutionState};
use crate::error::CoreError;
use crate::model::{Entry, LinkType, Target, TargetRole};
use crate::reconcile::Reconciler;

/// An editor holding at most one open draft.
pub struct Editor<R: CapabilityResolver> {
    draft: Option<Draft>,
    reconciler: Reconciler<R>,
}

impl<R: CapabilityResolver> Editor<R> {
    pub fn new(resolver: R, resolve_timeout: Duration) -> Self {
        Self {
            draft: None,
            reconciler: Reconciler::new(resolver, resolve_timeout),
        }
    }

    /// Open a draft, discarding any previous one.
    pub fn open(&mut self, draft: Draft) -> &Draft {
        if self.draft.is_some() {
            self.reconciler.cancel_pending();
        }
        self.draft.insert(draft)
    }

    pub fn begin_new(&mut self) -> &Draft {
        self.open(Draft::begin_new())
    }

    pub fn begin_edit(&mut self, entry: &Entry) -> &Draft {
        self.open(Draft::begin_edit(entry))
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    fn draft_mut(&mut self) -> Result<&mut Draft, CoreError> {
        self.draft.as_mut().ok_or_else(|| CoreError::ValidationFailed {
            message: "no entry is being edited".into(),
        })
    }

    // ── Edits ────────────────────────────────────────────────────

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<(), CoreError> {
        self.draft_mut()?.set_title(title);
        Ok(())
    }

    pub fn set_enabled(&mut self, enabled: bool) -> Result<(), CoreError> {
        self.draft_mut()?.set_enabled(enabled);
        Ok(())
    }

    /// Replace a target and start resolving when both are set.
    pub fn set_target(&mut self, role: TargetRole, target: Target) -> Result<(), CoreError> {
        if let Some(request) = self.draft_mut()?.set_target(role, target) {
            self.reconciler.dispatch(request);
        }
        Ok(())
    }

    pub fn set_link_field(&mut self, index: usize, edit: LinkEdit) -> Result<(), CoreError> {
        self.draft_mut()?.set_link_field(index, edit)
    }

    /// Like [`set_link_field`](Self::set_link_field), addressing the
    /// link by type.
    pub fn edit_link(&mut self, link_type: LinkType, edit: LinkEdit) -> Result<(), CoreError> {
        let draft = self.draft_mut()?;
        let index = draft
            .link_index(link_type)
            .ok_or_else(|| CoreError::ValidationFailed {
                message: format!("no {link_type} link is available for these targets"),
            })?;
        draft.set_link_field(index, edit)
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Merge every outcome that has already arrived.
    pub fn poll(&mut self) -> Vec<ApplyOutcome> {
        let mut applied = Vec::new();
        while let Some(outcome) = self.reconciler.try_next_outcome() {
            match self.draft.as_mut() {
                Some(draft) => applied.push(draft.apply(outcome)),
                None => applied.push(ApplyOutcome::Discarded),
            }
        }
        applied
    }

    /// Wait until the open draft is no longer resolving.
    ///
    /// Returns the resolver error if the draft ended up stale because
    /// its latest request failed.
    pub async fn settle(&mut self) -> Result<(), CoreError> {
        let mut last_error = None;
        loop {
            let Some(draft) = self.draft.as_mut() else {
                return Ok(());
            };
            if !draft.is_resolving() {
                return match last_error {
                    Some(e) if draft.state() == ResolutionState::Stale => Err(e),
                    _ => Ok(()),
                };
            }

            let Some(outcome) = self.reconciler.next_outcome().await else {
                return Err(CoreError::Internal("reconciler channel closed".into()));
            };
            match draft.apply(outcome) {
                ApplyOutcome::Failed(e) => last_error = Some(e),
                ApplyOutcome::Applied => last_error = None,
                ApplyOutcome::Discarded => {}
            }
        }
    }

    // ── Closing ──────────────────────────────────────────────────

    /// Hand the draft over (for saving) and close the session.
    pub fn take(&mut self) -> Option<Draft> {
        self.reconciler.cancel_pending();
        self.draft.take()
    }

    /// Drop the draft. Pending resolutions become no-ops.
    pub fn cancel(&mut self) {
        if let Some(draft) = self.take() {
            debug!(draft = %draft.id(), "editing cancelled");
        }
    }
}
