//! Edit intents and the edit engine.
//!
//! Input surfaces (keyboard, IME, clipboard, scripts) translate into
//! [`EditIntent`] values. [`dispatch`] applies one intent atomically to an
//! [`EditEngine`]: either the buffer, cursor and revision all change together,
//! or nothing changes and the result reports no edit.

use serde::Deserialize;

mod dispatcher;
mod engine;

pub use dispatcher::{DispatchResult, dispatch};
pub use engine::EditEngine;

pub use core_state::{CursorModel, Direction, Position, Selection};
pub use core_text::LineBuffer;

/// Cursor motion requested by an input surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    DocumentStart,
    DocumentEnd,
    PageUp(usize),
    PageDown(usize),
}

/// One user-level intent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditIntent {
    Insert(String),
    Paste(String),
    Enter,
    Backspace,
    DeleteForward,
    Cut,
    SelectAll,
    Move {
        motion: Motion,
        #[serde(default)]
        extend: bool,
    },
    CompositionStart,
    CompositionUpdate(String),
    CompositionEnd(String),
    CompositionCancel,
}

/// Classification of a completed edit, carried for logging and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Paste,
    Enter,
    Backspace,
    DeleteForward,
    Cut,
    Composition,
}

impl EditKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EditKind::Insert => "insert",
            EditKind::Paste => "paste",
            EditKind::Enter => "enter",
            EditKind::Backspace => "backspace",
            EditKind::DeleteForward => "delete_forward",
            EditKind::Cut => "cut",
            EditKind::Composition => "composition",
        }
    }
}

/// Summary of one successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOutcome {
    pub kind: EditKind,
    /// Document revision after the edit.
    pub revision: u64,
    /// Cursor after the edit (selection is always collapsed).
    pub cursor: Position,
    /// Lowest line touched by the edit.
    pub first_line: usize,
}
