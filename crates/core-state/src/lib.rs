//! Cursor, selection and composition state.
//!
//! `CursorModel` owns the caret position and the optional selection anchor.
//! The selection is never stored separately: it is derived from
//! `(anchor, cursor)` on demand and is absent whenever the two coincide.
//!
//! Every motion takes an `extend` flag:
//! - `extend` with no anchor drops the anchor at the pre-move position;
//! - `!extend` with an anchor clears it, collapsing in place at the new cursor.
//!
//! Motions never mutate the buffer and never fail; movement past document
//! bounds is a no-op.

use core_text::{LineBuffer, grapheme};
use tracing::trace;

mod composition;

pub use composition::CompositionState;
pub use core_text::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

/// Non-empty selection between an anchor and the active end (the cursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    /// `None` when `anchor == active`.
    pub fn new(anchor: Position, active: Position) -> Option<Self> {
        (anchor != active).then_some(Self { anchor, active })
    }

    /// Earlier end (line, then column).
    pub fn start(&self) -> Position {
        self.anchor.min(self.active)
    }

    /// Later end.
    pub fn end(&self) -> Position {
        self.anchor.max(self.active)
    }

    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }

    pub fn contains_line(&self, line: usize) -> bool {
        (self.start().line..=self.end().line).contains(&line)
    }

    /// Selected column range on `line`, given that line's length. Interior
    /// lines cover the whole line; `None` when the line is outside the selection.
    pub fn columns_on_line(&self, line: usize, line_len: usize) -> Option<(usize, usize)> {
        if !self.contains_line(line) {
            return None;
        }
        let (start, end) = (self.start(), self.end());
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { line_len };
        Some((from, to))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorModel {
    cursor: Position,
    anchor: Option<Position>,
    dragging: bool,
}

impl CursorModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Position {
        self.cursor
    }

    pub fn anchor(&self) -> Option<Position> {
        self.anchor
    }

    pub fn selection(&self) -> Option<Selection> {
        self.anchor.and_then(|a| Selection::new(a, self.cursor))
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Place the cursor at `pos` and drop any selection. Used by the edit
    /// engine after a mutation.
    pub fn collapse_to(&mut self, pos: Position) {
        self.cursor = pos;
        self.anchor = None;
    }

    fn begin_motion(&mut self, extend: bool) {
        if extend {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
    }

    fn finish_motion(&self, op: &'static str, from: Position) {
        trace!(target: "state.cursor", op, from_line = from.line, from_column = from.column, line = self.cursor.line, column = self.cursor.column, anchored = self.anchor.is_some(), "motion");
    }

    /// One grapheme left/right, wrapping across line ends. No-op at document bounds.
    pub fn move_horizontal(&mut self, buf: &LineBuffer, dir: Direction, extend: bool) {
        let from = self.cursor;
        self.begin_motion(extend);
        let line = buf.line(from.line);
        self.cursor = match dir {
            Direction::Backward if from.column > 0 => {
                Position::new(from.line, grapheme::prev_column(line, from.column))
            }
            Direction::Backward if from.line > 0 => {
                Position::new(from.line - 1, buf.line_len(from.line - 1))
            }
            Direction::Forward if from.column < buf.line_len(from.line) => {
                Position::new(from.line, grapheme::next_column(line, from.column))
            }
            Direction::Forward if from.line + 1 < buf.line_count() => {
                Position::new(from.line + 1, 0)
            }
            _ => from,
        };
        self.finish_motion("horizontal", from);
    }

    /// One line up/down; column becomes `min(previous column, new line length)`.
    /// There is no remembered desired column across consecutive moves.
    pub fn move_vertical(&mut self, buf: &LineBuffer, dir: Direction, extend: bool) {
        let from = self.cursor;
        self.move_lines(buf, dir, 1, extend);
        self.finish_motion("vertical", from);
    }

    /// Move `lines` lines at once (page up/down), clamped to the document.
    pub fn move_page(&mut self, buf: &LineBuffer, dir: Direction, lines: usize, extend: bool) {
        let from = self.cursor;
        self.move_lines(buf, dir, lines.max(1), extend);
        self.finish_motion("page", from);
    }

    fn move_lines(&mut self, buf: &LineBuffer, dir: Direction, lines: usize, extend: bool) {
        self.begin_motion(extend);
        let last = buf.line_count() - 1;
        let line = match dir {
            Direction::Backward => self.cursor.line.saturating_sub(lines),
            Direction::Forward => self.cursor.line.saturating_add(lines).min(last),
        };
        let column = self.cursor.column.min(buf.line_len(line));
        self.cursor = Position::new(line, column);
    }

    pub fn move_to_line_start(&mut self, extend: bool) {
        let from = self.cursor;
        self.begin_motion(extend);
        self.cursor.column = 0;
        self.finish_motion("line_start", from);
    }

    pub fn move_to_line_end(&mut self, buf: &LineBuffer, extend: bool) {
        let from = self.cursor;
        self.begin_motion(extend);
        self.cursor.column = buf.line_len(from.line);
        self.finish_motion("line_end", from);
    }

    pub fn move_to_document_start(&mut self, extend: bool) {
        let from = self.cursor;
        self.begin_motion(extend);
        self.cursor = Position::origin();
        self.finish_motion("document_start", from);
    }

    pub fn move_to_document_end(&mut self, buf: &LineBuffer, extend: bool) {
        let from = self.cursor;
        self.begin_motion(extend);
        self.cursor = buf.end_position();
        self.finish_motion("document_end", from);
    }

    pub fn select_all(&mut self, buf: &LineBuffer) {
        self.anchor = Some(Position::origin());
        self.cursor = buf.end_position();
        trace!(target: "state.cursor", line = self.cursor.line, column = self.cursor.column, "select_all");
    }

    /// Jump to `pos` (click without drag, go-to). Panics if `pos` is outside `buf`.
    pub fn set_position(&mut self, buf: &LineBuffer, pos: Position, extend: bool) {
        assert!(
            buf.contains(pos),
            "cursor position {pos:?} outside buffer ({} lines)",
            buf.line_count()
        );
        let from = self.cursor;
        self.begin_motion(extend);
        self.cursor = pos;
        self.finish_motion("set", from);
    }

    // ---------------------------------------------------------------------
    // Mouse drag selection
    // ---------------------------------------------------------------------

    /// Mouse down: anchor at the click (or keep the existing anchor when
    /// `shift` is held), cursor at the click, drag begins.
    pub fn mouse_down(&mut self, buf: &LineBuffer, pos: Position, shift: bool) {
        self.set_position(buf, pos, shift);
        if !shift {
            self.anchor = Some(pos);
        }
        self.dragging = true;
    }

    /// Mouse move: only the cursor follows while a drag is active.
    pub fn mouse_move(&mut self, buf: &LineBuffer, pos: Position) {
        if !self.dragging {
            return;
        }
        let pos = buf.clamp(pos);
        self.cursor = pos;
        trace!(target: "state.cursor", line = pos.line, column = pos.column, "drag");
    }

    /// Mouse up: ends the drag; an empty selection collapses.
    pub fn mouse_up(&mut self) {
        self.dragging = false;
        if self.anchor == Some(self.cursor) {
            self.anchor = None;
        }
    }

    /// Re-validate cursor and anchor after a wholesale document replace.
    pub fn clamp_to(&mut self, buf: &LineBuffer) {
        self.cursor = buf.clamp(self.cursor);
        self.anchor = self.anchor.map(|a| buf.clamp(a));
        if self.anchor == Some(self.cursor) {
            self.anchor = None;
        }
    }
}
