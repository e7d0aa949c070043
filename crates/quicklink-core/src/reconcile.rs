// ── Link reconciliation ──
//
// Dispatches resolve requests to a `CapabilityResolver` on background
// tasks and hands back outcomes tagged with the originating draft and
// generation. Ordering is decided by `Draft::apply`, not here.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backend::CapabilityResolver;
use crate::draft::DraftId;
use crate::error::CoreError;
use crate::model::{Link, Target};

const OUTCOME_CHANNEL_SIZE: usize = 16;

/// What the resolver says is possible between two targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Suggested entry title.
    pub title: String,
    /// Candidate links, in resolver order.
    pub links: Vec<Link>,
}

/// A request emitted by `Draft::set_target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveRequest {
    pub draft: DraftId,
    pub generation: u64,
    pub source: Target,
    pub destination: Target,
}

/// The resolver's answer to a [`ResolveRequest`], carrying its tags.
#[derive(Debug)]
pub struct ResolveOutcome {
    pub draft: DraftId,
    pub generation: u64,
    pub result: Result<Resolution, CoreError>,
}

/// Runs resolve requests concurrently and collects their outcomes.
pub struct Reconciler<R: CapabilityResolver> {
    resolver: Arc<R>,
    timeout: Duration,
    outcome_tx: mpsc::Sender<ResolveOutcome>,
    outcome_rx: mpsc::Receiver<ResolveOutcome>,
    cancel: CancellationToken,
}

impl<R: CapabilityResolver> Reconciler<R> {
    /// `timeout` bounds each resolver call; a hung call becomes a
    /// [`CoreError::ResolverFailed`] outcome.
    pub fn new(resolver: R, timeout: Duration) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel(OUTCOME_CHANNEL_SIZE);
        Self {
            resolver: Arc::new(resolver),
            timeout,
            outcome_tx,
            outcome_rx,
            cancel: CancellationToken::new(),
        }
    }

    /// Start resolving in the background.
    pub fn dispatch(&self, request: ResolveRequest) {
        let resolver = Arc::clone(&self.resolver);
        let tx = self.outcome_tx.clone();
        let cancel = self.cancel.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            debug!(
                draft = %request.draft,
                generation = request.generation,
                source = %request.source,
                destination = %request.destination,
                "resolving links"
            );
            let call = resolver.resolve(&request.source, &request.destination);
            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = tokio::time::timeout(timeout, call) => match result {
                    Ok(result) => result,
                    Err(_) => Err(CoreError::ResolverFailed {
                        message: format!("no answer within {}s", timeout.as_secs()),
                    }),
                },
            };
            if let Err(ref e) = result {
                warn!(error = %e, generation = request.generation, "link resolution failed");
            }

            let outcome = ResolveOutcome {
                draft: request.draft,
                generation: request.generation,
                result,
            };
            // The receiver lives as long as the reconciler.
            let _ = tx.send(outcome).await;
        });
    }

    /// Wait for the next outcome, in arrival order.
    pub async fn next_outcome(&mut self) -> Option<ResolveOutcome> {
        self.outcome_rx.recv().await
    }

    /// Take an outcome if one is ready.
    pub fn try_next_outcome(&mut self) -> Option<ResolveOutcome> {
        self.outcome_rx.try_recv().ok()
    }

    /// Abandon every in-flight request.
    ///
    /// Outcomes already queued still arrive; drafts discard them by tag.
    pub fn cancel_pending(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
    }
}

impl<R: CapabilityResolver> Drop for Reconciler<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
