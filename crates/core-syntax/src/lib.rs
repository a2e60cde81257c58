//! Syntax highlighting: span model, sources and the refresh scheduler.
//!
//! Spans are absolute char offsets over the joined document (`\n` counts as
//! one char) and are always replaced wholesale. Computation is asynchronous:
//! the [`HighlightScheduler`] debounces refresh requests, hands the snapshot
//! to a [`HighlightSource`] (directly or through a [`HighlightWorker`]
//! thread) and drops any result whose `(buffer, revision)` no longer matches
//! the live document.

use core_events::BufferId;
use serde::{Deserialize, Serialize};
use std::ops::Range;

mod index;
mod kind;
mod language;
mod scheduler;
mod treesitter;
mod worker;

pub use index::SpanIndex;
pub use kind::HighlightKind;
pub use language::LanguageId;
pub use scheduler::{AcceptOutcome, HighlightScheduler};
pub use treesitter::TreeSitterHighlighter;
pub use worker::{HighlightReply, HighlightWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub kind: HighlightKind,
}

impl HighlightSpan {
    pub fn new(start: usize, end: usize, kind: HighlightKind) -> Self {
        Self { start, end, kind }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Half-open overlap with `range`.
    pub fn overlaps(&self, range: &Range<usize>) -> bool {
        self.start < range.end && self.end > range.start
    }
}

/// Snapshot identity used for staleness checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentIdentity {
    pub buffer_id: BufferId,
    pub revision: u64,
}

impl DocumentIdentity {
    pub fn new(buffer_id: BufferId, revision: u64) -> Self {
        Self {
            buffer_id,
            revision,
        }
    }
}

/// Text snapshot to highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightRequest {
    pub identity: DocumentIdentity,
    pub text: String,
}

/// Spans computed for a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    pub identity: DocumentIdentity,
    pub spans: Vec<HighlightSpan>,
}

#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("grammar rejected by tree-sitter runtime: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("invalid highlight query: {0}")]
    Query(#[from] tree_sitter::QueryError),
    #[error("parser produced no tree")]
    ParseFailed,
    #[error("highlight worker is not running")]
    WorkerDisconnected,
    #[error("failed to start highlight worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("highlight source failed: {0}")]
    Source(String),
}

/// Provider of highlight spans for a full document snapshot.
///
/// Implemented by the local tree-sitter highlighter and by host adapters that
/// forward to an external service.
pub trait HighlightSource: Send {
    fn get_highlights(
        &mut self,
        buffer_id: BufferId,
        text: &str,
    ) -> Result<Vec<HighlightSpan>, HighlightError>;
}

/// Order spans on start, longer spans first on ties.
pub fn sort_spans(spans: &mut [HighlightSpan]) {
    spans.sort_by_key(|s| (s.start, std::cmp::Reverse(s.end)));
}
