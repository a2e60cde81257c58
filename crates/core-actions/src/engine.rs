//! Atomic edit application over a `LineBuffer` + `CursorModel`.
//!
//! Each `apply_*` call either performs exactly one logical edit and returns an
//! [`EditOutcome`] (revision bumped, selection collapsed at the returned
//! cursor) or returns `None` with no observable change.
//!
//! Composition: while an IME composition is active, raw input edits are
//! suppressed; the committed text is inserted once, at the position captured
//! when the composition began.

use crate::{EditKind, EditOutcome, Motion};
use core_state::{CompositionState, CursorModel, Direction, Position, Selection};
use core_text::{LineBuffer, segment};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct EditEngine {
    buffer: LineBuffer,
    cursor: CursorModel,
    composition: Option<CompositionState>,
    revision: u64,
}

impl EditEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            buffer: LineBuffer::from_text(text),
            ..Self::default()
        }
    }

    /// Fresh document whose revision counter starts at `revision`, so
    /// identities issued for an earlier document in the same session are
    /// never reused.
    pub fn with_revision(text: &str, revision: u64) -> Self {
        Self {
            revision,
            ..Self::from_text(text)
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> &CursorModel {
        &self.cursor
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn selection(&self) -> Option<Selection> {
        self.cursor.selection()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.buffer.text()
    }

    pub fn composition(&self) -> Option<&CompositionState> {
        self.composition.as_ref()
    }

    pub fn is_composing(&self) -> bool {
        self.composition.is_some()
    }

    /// Replace the whole document (external content change or undo/redo
    /// response). Cursor and anchor are clamped; an active composition is
    /// dropped since its origin may no longer exist. Returns the new revision.
    pub fn replace_content(&mut self, text: &str) -> u64 {
        self.buffer.replace_all(text);
        self.cursor.clamp_to(&self.buffer);
        if self.composition.take().is_some() {
            debug!(target: "actions.edit", "composition dropped by content replace");
        }
        self.revision += 1;
        trace!(target: "actions.edit", revision = self.revision, lines = self.buffer.line_count(), "replace_content");
        self.revision
    }

    // ---------------------------------------------------------------------
    // Cursor
    // ---------------------------------------------------------------------

    /// Move the cursor to `pos`. Panics if `pos` is outside the buffer.
    pub fn set_cursor(&mut self, pos: Position, extend: bool) {
        self.cursor.set_position(&self.buffer, pos, extend);
    }

    /// Select from `anchor` to `active` (cursor ends at `active`).
    pub fn select(&mut self, anchor: Position, active: Position) {
        self.cursor.set_position(&self.buffer, anchor, false);
        self.cursor.set_position(&self.buffer, active, true);
    }

    pub fn select_all(&mut self) {
        self.cursor.select_all(&self.buffer);
    }

    pub fn mouse_down(&mut self, pos: Position, shift: bool) {
        self.cursor.mouse_down(&self.buffer, pos, shift);
    }

    pub fn mouse_move(&mut self, pos: Position) {
        self.cursor.mouse_move(&self.buffer, pos);
    }

    pub fn mouse_up(&mut self) {
        self.cursor.mouse_up();
    }

    /// Apply a motion. Returns true if the cursor or selection changed.
    pub fn apply_motion(&mut self, motion: Motion, extend: bool) -> bool {
        let before = (self.cursor.position(), self.cursor.anchor());
        let buf = &self.buffer;
        let cur = &mut self.cursor;
        match motion {
            Motion::Left => cur.move_horizontal(buf, Direction::Backward, extend),
            Motion::Right => cur.move_horizontal(buf, Direction::Forward, extend),
            Motion::Up => cur.move_vertical(buf, Direction::Backward, extend),
            Motion::Down => cur.move_vertical(buf, Direction::Forward, extend),
            Motion::LineStart => cur.move_to_line_start(extend),
            Motion::LineEnd => cur.move_to_line_end(buf, extend),
            Motion::DocumentStart => cur.move_to_document_start(extend),
            Motion::DocumentEnd => cur.move_to_document_end(buf, extend),
            Motion::PageUp(n) => cur.move_page(buf, Direction::Backward, n, extend),
            Motion::PageDown(n) => cur.move_page(buf, Direction::Forward, n, extend),
        }
        before != (self.cursor.position(), self.cursor.anchor())
    }

    // ---------------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------------

    pub fn selected_text(&self) -> Option<String> {
        self.cursor
            .selection()
            .map(|s| self.buffer.slice(s.start(), s.end()))
    }

    /// Delete the selection if present, returning its start.
    fn take_selection(&mut self) -> Option<Position> {
        let sel = self.cursor.selection()?;
        let start = self.buffer.delete_range(sel.start(), sel.end());
        self.cursor.collapse_to(start);
        Some(start)
    }

    fn commit(&mut self, kind: EditKind, first_line: usize) -> EditOutcome {
        self.revision += 1;
        let cursor = self.cursor.position();
        trace!(target: "actions.edit", op = kind.as_str(), revision = self.revision, first_line, line = cursor.line, column = cursor.column, "edit");
        EditOutcome {
            kind,
            revision: self.revision,
            cursor,
            first_line,
        }
    }

    fn suppressed(&self, op: &'static str) -> bool {
        if self.composition.is_some() {
            trace!(target: "actions.edit", op, "suppressed during composition");
            return true;
        }
        false
    }

    fn insert_at_cursor(&mut self, text: &str, kind: EditKind) -> Option<EditOutcome> {
        let had_selection = self.cursor.has_selection();
        if text.is_empty() && !had_selection {
            return None;
        }
        let at = self
            .take_selection()
            .unwrap_or_else(|| self.cursor.position());
        let end = self.buffer.insert(at, text);
        self.cursor.collapse_to(end);
        Some(self.commit(kind, at.line))
    }

    /// Type `text` at the cursor, replacing the selection if any.
    pub fn apply_insert(&mut self, text: &str) -> Option<EditOutcome> {
        if self.suppressed("insert") {
            return None;
        }
        self.insert_at_cursor(text, EditKind::Insert)
    }

    /// Same as insert, tagged as a paste.
    pub fn apply_paste(&mut self, text: &str) -> Option<EditOutcome> {
        if self.suppressed("paste") {
            return None;
        }
        self.insert_at_cursor(text, EditKind::Paste)
    }

    pub fn apply_enter(&mut self) -> Option<EditOutcome> {
        if self.suppressed("enter") {
            return None;
        }
        self.insert_at_cursor("\n", EditKind::Enter)
    }

    /// Delete the selection, or the cluster before the cursor. No-op at `{0,0}`
    /// without a selection.
    pub fn apply_backspace(&mut self) -> Option<EditOutcome> {
        if self.suppressed("backspace") {
            return None;
        }
        if let Some(start) = self.take_selection() {
            return Some(self.commit(EditKind::Backspace, start.line));
        }
        let at = self.cursor.position();
        if at == Position::origin() {
            return None;
        }
        let end = self.buffer.delete_backward(at);
        self.cursor.collapse_to(end);
        Some(self.commit(EditKind::Backspace, end.line))
    }

    /// Delete the selection, or the cluster after the cursor. No-op at
    /// document end without a selection.
    pub fn apply_delete_forward(&mut self) -> Option<EditOutcome> {
        if self.suppressed("delete_forward") {
            return None;
        }
        if let Some(start) = self.take_selection() {
            return Some(self.commit(EditKind::DeleteForward, start.line));
        }
        let at = self.cursor.position();
        if at == self.buffer.end_position() {
            return None;
        }
        let end = self.buffer.delete_forward(at);
        self.cursor.collapse_to(end);
        Some(self.commit(EditKind::DeleteForward, at.line))
    }

    /// Remove the selection and return its text.
    pub fn cut_selection(&mut self) -> Option<(String, EditOutcome)> {
        if self.suppressed("cut") {
            return None;
        }
        let text = self.selected_text()?;
        let start = self.take_selection()?;
        Some((text, self.commit(EditKind::Cut, start.line)))
    }

    // ---------------------------------------------------------------------
    // IME composition
    // ---------------------------------------------------------------------

    /// Capture the cursor as the composition origin. A second call while
    /// composing keeps the original origin.
    pub fn begin_composition(&mut self) {
        if self.composition.is_some() {
            return;
        }
        let origin = self.cursor.position();
        self.composition = Some(CompositionState::new(origin));
        trace!(target: "actions.edit", line = origin.line, column = origin.column, "composition start");
    }

    /// Store the preedit text. Starts a composition if none is active.
    pub fn update_composition(&mut self, text: &str) {
        self.begin_composition();
        if let Some(c) = self.composition.as_mut() {
            c.update(text);
        }
    }

    /// Commit `text` (NFC-normalized) with one insert at the captured origin.
    /// Empty text ends the composition without an edit.
    pub fn end_composition(&mut self, text: &str) -> Option<EditOutcome> {
        let origin = self
            .composition
            .take()
            .map(|c| c.origin())
            .unwrap_or_else(|| self.cursor.position());
        let committed = segment::nfc(text);
        if committed.is_empty() {
            trace!(target: "actions.edit", "composition ended empty");
            return None;
        }
        if !self.cursor.has_selection() {
            self.cursor.collapse_to(self.buffer.clamp(origin));
        }
        self.insert_at_cursor(&committed, EditKind::Composition)
    }

    /// Abandon the composition without touching the buffer.
    pub fn cancel_composition(&mut self) -> bool {
        let cancelled = self.composition.take().is_some();
        if cancelled {
            trace!(target: "actions.edit", "composition cancelled");
        }
        cancelled
    }
}
