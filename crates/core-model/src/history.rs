//! Undo/redo authority seam and an in-process implementation.
//!
//! The session never undoes locally: it asks a [`BufferAuthority`] for the
//! document content to show and applies that content as a full replace.
//! [`LocalHistory`] keeps whole-document snapshots per buffer for hosts that
//! have no authority of their own. Consecutive typing or erasing on one line
//! collapses into a single undo step, capped at [`MERGE_CHAR_LIMIT`] chars.

use core_actions::Position;
use core_events::BufferId;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use tracing::trace;

/// Maximum number of snapshots retained per buffer.
pub const UNDO_HISTORY_MAX: usize = 200;

/// Longest run of typed or erased chars folded into one undo step.
pub const MERGE_CHAR_LIMIT: usize = 50;

/// What produced a recorded snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Initial content, a buffer switch or an external replace.
    Load,
    /// Plain text inserted at a collapsed cursor.
    Typing,
    /// Backspace at a collapsed cursor.
    Erasing,
    /// Anything else: line breaks, paste, cut, selection replacement.
    Other,
}

/// Context passed with each recorded snapshot so an authority can group
/// keystrokes into undo steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: RecordKind,
    /// Cursor before the edit.
    pub before: Position,
    /// Cursor after the edit.
    pub after: Position,
}

impl EditRecord {
    pub fn new(kind: RecordKind, before: Position, after: Position) -> Self {
        Self {
            kind,
            before,
            after,
        }
    }

    pub fn load() -> Self {
        Self::new(RecordKind::Load, Position::origin(), Position::origin())
    }

    /// Chars added or removed on a single line.
    fn span(&self) -> usize {
        self.after.column.abs_diff(self.before.column)
    }

    fn single_line(&self) -> bool {
        self.before.line == self.after.line
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthorityError {
    #[error("buffer {0} is unknown to the history authority")]
    UnknownBuffer(BufferId),
    #[error("history authority unavailable: {0}")]
    Unavailable(String),
}

/// External owner of undo/redo history.
///
/// `undo`/`redo` return the full document content to display, or `None`
/// when there is nothing to undo/redo.
pub trait BufferAuthority {
    fn undo(&mut self, buffer_id: BufferId) -> Result<Option<String>, AuthorityError>;
    fn redo(&mut self, buffer_id: BufferId) -> Result<Option<String>, AuthorityError>;

    /// Observe the document content after an edit or load.
    fn record(&mut self, _buffer_id: BufferId, _content: &str, _edit: EditRecord) {}

    /// Group every snapshot recorded until [`end_transaction`](Self::end_transaction)
    /// into one undo step.
    fn begin_transaction(&mut self, _buffer_id: BufferId) {}

    fn end_transaction(&mut self, _buffer_id: BufferId) {}
}

#[derive(Clone)]
struct Snapshot {
    content: String,
    hash: u64,
}

impl Snapshot {
    fn new(content: &str) -> Self {
        Self {
            content: content.to_owned(),
            hash: content_hash(content),
        }
    }
}

/// Open run of keystrokes that later snapshots may fold into.
#[derive(Debug, Clone, Copy)]
struct Run {
    kind: RecordKind,
    end: Position,
    chars: usize,
}

#[derive(Default)]
struct BufferHistory {
    current: Option<Snapshot>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    run: Option<Run>,
    /// `Some(started)` while a transaction is open; `started` once its first
    /// snapshot has opened an undo step.
    transaction: Option<bool>,
}

impl BufferHistory {
    fn continues_run(&self, edit: &EditRecord) -> bool {
        let Some(run) = self.run else {
            return false;
        };
        matches!(edit.kind, RecordKind::Typing | RecordKind::Erasing)
            && run.kind == edit.kind
            && run.end == edit.before
            && run.chars < MERGE_CHAR_LIMIT
            && edit.single_line()
    }

    fn next_run(&self, edit: &EditRecord, merged: bool) -> Option<Run> {
        if !matches!(edit.kind, RecordKind::Typing | RecordKind::Erasing) || !edit.single_line() {
            return None;
        }
        let carried = if merged {
            self.run.map_or(0, |r| r.chars)
        } else {
            0
        };
        Some(Run {
            kind: edit.kind,
            end: edit.after,
            chars: carried + edit.span(),
        })
    }
}

/// Snapshot history for any number of buffers.
#[derive(Default)]
pub struct LocalHistory {
    buffers: HashMap<BufferId, BufferHistory>,
    snapshots_skipped: u64,
}

impl std::fmt::Debug for LocalHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalHistory")
            .field("buffers", &self.buffers.len())
            .field("snapshots_skipped", &self.snapshots_skipped)
            .finish()
    }
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn undo_depth(&self, buffer_id: BufferId) -> usize {
        self.buffers
            .get(&buffer_id)
            .map_or(0, |h| h.undo_stack.len())
    }

    pub fn redo_depth(&self, buffer_id: BufferId) -> usize {
        self.buffers
            .get(&buffer_id)
            .map_or(0, |h| h.redo_stack.len())
    }

    /// Recorded snapshots identical to the current one.
    pub fn snapshots_skipped(&self) -> u64 {
        self.snapshots_skipped
    }

    pub fn forget(&mut self, buffer_id: BufferId) {
        self.buffers.remove(&buffer_id);
    }

    fn history(&mut self, buffer_id: BufferId) -> Result<&mut BufferHistory, AuthorityError> {
        self.buffers
            .get_mut(&buffer_id)
            .ok_or(AuthorityError::UnknownBuffer(buffer_id))
    }
}

impl BufferAuthority for LocalHistory {
    fn undo(&mut self, buffer_id: BufferId) -> Result<Option<String>, AuthorityError> {
        let h = self.history(buffer_id)?;
        let Some(prev) = h.undo_stack.pop() else {
            return Ok(None);
        };
        if let Some(current) = h.current.replace(prev.clone()) {
            h.redo_stack.push(current);
        }
        h.run = None;
        trace!(target: "model.history", %buffer_id, undo_depth = h.undo_stack.len(), redo_depth = h.redo_stack.len(), "undo_pop");
        Ok(Some(prev.content))
    }

    fn redo(&mut self, buffer_id: BufferId) -> Result<Option<String>, AuthorityError> {
        let h = self.history(buffer_id)?;
        let Some(next) = h.redo_stack.pop() else {
            return Ok(None);
        };
        if let Some(current) = h.current.replace(next.clone()) {
            h.undo_stack.push(current);
        }
        h.run = None;
        trace!(target: "model.history", %buffer_id, undo_depth = h.undo_stack.len(), redo_depth = h.redo_stack.len(), "redo_pop");
        Ok(Some(next.content))
    }

    fn begin_transaction(&mut self, buffer_id: BufferId) {
        let h = self.buffers.entry(buffer_id).or_default();
        h.transaction = Some(false);
        h.run = None;
    }

    fn end_transaction(&mut self, buffer_id: BufferId) {
        if let Some(h) = self.buffers.get_mut(&buffer_id) {
            h.transaction = None;
            h.run = None;
        }
    }

    fn record(&mut self, buffer_id: BufferId, content: &str, edit: EditRecord) {
        let snap = Snapshot::new(content);
        let h = self.buffers.entry(buffer_id).or_default();
        if h.current.as_ref().is_some_and(|c| c.hash == snap.hash) {
            self.snapshots_skipped += 1;
            trace!(target: "model.history", %buffer_id, hash = snap.hash, "snapshot_dedupe_skip");
            return;
        }
        let merge = match h.transaction {
            Some(started) => started,
            None => h.continues_run(&edit),
        };
        if h.transaction == Some(false) {
            h.transaction = Some(true);
        }
        h.run = match h.transaction {
            Some(_) => None,
            None => h.next_run(&edit, merge),
        };
        if merge && h.current.is_some() {
            h.current = Some(snap);
            h.redo_stack.clear();
            trace!(target: "model.history", %buffer_id, kind = ?edit.kind, "snapshot_merged");
            return;
        }
        if let Some(prev) = h.current.replace(snap) {
            h.undo_stack.push(prev);
            if h.undo_stack.len() > UNDO_HISTORY_MAX {
                h.undo_stack.remove(0);
                trace!(target: "model.history", %buffer_id, "undo_stack_trimmed");
            }
        }
        h.redo_stack.clear();
        trace!(target: "model.history", %buffer_id, undo_depth = h.undo_stack.len(), "record");
    }
}

fn content_hash(content: &str) -> u64 {
    let mut h = DefaultHasher::new();
    h.write(content.as_bytes());
    h.finish()
}
