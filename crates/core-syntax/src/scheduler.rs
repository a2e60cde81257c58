//! Debounced highlight refresh with stale-result discard.
//!
//! The scheduler owns the applied span set for one live document. Refresh
//! requests are debounced; when the timer fires, [`HighlightScheduler::poll`]
//! hands out the latest snapshot and remembers its identity as in flight.
//! A result is applied only if it is the in-flight snapshot *and* still
//! matches the live document identity at the time it arrives.

use crate::{
    DocumentIdentity, HighlightError, HighlightRequest, HighlightResult, HighlightSource,
    HighlightSpan, SpanIndex,
};
use core_events::Debouncer;
use std::ops::Range;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

pub const DEFAULT_HIGHLIGHT_DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct HighlightScheduler {
    debounce: Debouncer<HighlightRequest>,
    enabled: bool,
    spans: SpanIndex,
    applied: Option<DocumentIdentity>,
    in_flight: Option<DocumentIdentity>,
    computations: u64,
}

impl Default for HighlightScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_HIGHLIGHT_DEBOUNCE)
    }
}

impl HighlightScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debouncer::new(delay),
            enabled: true,
            spans: SpanIndex::default(),
            applied: None,
            in_flight: None,
            computations: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops pending work and clears the applied spans.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.cancel();
            self.spans.clear();
            self.applied = None;
        }
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.debounce.set_delay(delay);
    }

    /// Queue a refresh for `request`, restarting the debounce window.
    pub fn request(&mut self, request: HighlightRequest, now: Instant) {
        if !self.enabled {
            return;
        }
        if let Some(replaced) = self.debounce.schedule(request, now) {
            trace!(
                target: "syntax.scheduler",
                revision = replaced.identity.revision,
                "coalesced pending highlight request"
            );
        }
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Snapshot to compute, once the debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<HighlightRequest> {
        let request = self.debounce.poll(now)?;
        self.computations += 1;
        self.in_flight = Some(request.identity);
        debug!(
            target: "syntax.scheduler",
            buffer = %request.identity.buffer_id,
            revision = request.identity.revision,
            "highlight refresh due"
        );
        Some(request)
    }

    /// Apply `result` if it still describes the live document `current`.
    pub fn accept(&mut self, result: HighlightResult, current: DocumentIdentity) -> AcceptOutcome {
        let identity = result.identity;
        if identity != current || self.in_flight != Some(identity) {
            debug!(
                target: "syntax.scheduler",
                buffer = %identity.buffer_id,
                revision = identity.revision,
                current_revision = current.revision,
                "discarding stale highlight result"
            );
            if self.in_flight == Some(identity) {
                self.in_flight = None;
            }
            return AcceptOutcome::Stale;
        }
        self.spans = SpanIndex::new(result.spans);
        self.applied = Some(identity);
        self.in_flight = None;
        trace!(
            target: "syntax.scheduler",
            revision = identity.revision,
            spans = self.spans.len(),
            "highlight applied"
        );
        AcceptOutcome::Applied
    }

    /// Record a failed computation; the previously applied spans stay.
    pub fn fail(&mut self, identity: DocumentIdentity, err: &HighlightError) {
        warn!(
            target: "syntax.scheduler",
            buffer = %identity.buffer_id,
            revision = identity.revision,
            error = %err,
            "highlight source failed"
        );
        if self.in_flight == Some(identity) {
            self.in_flight = None;
        }
    }

    /// Drop the pending request and invalidate whatever is in flight.
    pub fn cancel(&mut self) {
        let dropped = self.debounce.cancel();
        let in_flight = self.in_flight.take();
        if dropped.is_some() || in_flight.is_some() {
            debug!(
                target: "syntax.scheduler",
                pending = dropped.is_some(),
                in_flight = in_flight.is_some(),
                "highlight work cancelled"
            );
        }
    }

    /// Forget the applied spans, e.g. when the session shows another buffer.
    pub fn clear(&mut self) {
        self.cancel();
        self.spans.clear();
        self.applied = None;
    }

    /// Compute a due refresh synchronously with `source`.
    pub fn run_due(
        &mut self,
        now: Instant,
        source: &mut dyn HighlightSource,
        current: DocumentIdentity,
    ) -> Option<AcceptOutcome> {
        let request = self.poll(now)?;
        match source.get_highlights(request.identity.buffer_id, &request.text) {
            Ok(spans) => Some(self.accept(
                HighlightResult {
                    identity: request.identity,
                    spans,
                },
                current,
            )),
            Err(err) => {
                self.fail(request.identity, &err);
                None
            }
        }
    }

    pub fn spans(&self) -> &[HighlightSpan] {
        self.spans.as_slice()
    }

    pub fn span_index(&self) -> &SpanIndex {
        &self.spans
    }

    /// Applied spans overlapping a line's char range.
    pub fn spans_for_line(&self, range: Range<usize>) -> Vec<HighlightSpan> {
        self.spans.in_range(&range).copied().collect()
    }

    pub fn applied(&self) -> Option<DocumentIdentity> {
        self.applied
    }

    pub fn in_flight(&self) -> Option<DocumentIdentity> {
        self.in_flight
    }

    /// Number of snapshots handed out for computation.
    pub fn computations(&self) -> u64 {
        self.computations
    }
}
