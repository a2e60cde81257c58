//! Apply an [`EditIntent`] to an [`EditEngine`].

use crate::{EditEngine, EditIntent, EditOutcome};

/// Result of dispatching a single intent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchResult {
    /// Set when the buffer changed.
    pub edit: Option<EditOutcome>,
    /// Cursor or selection changed (always true when `edit` is set).
    pub cursor_moved: bool,
    /// Text removed by a cut.
    pub clipboard: Option<String>,
}

impl DispatchResult {
    fn clean() -> Self {
        Self::default()
    }

    fn moved(moved: bool) -> Self {
        Self {
            cursor_moved: moved,
            ..Self::default()
        }
    }

    fn edited(edit: Option<EditOutcome>) -> Self {
        Self {
            cursor_moved: edit.is_some(),
            edit,
            clipboard: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        self.edit.is_some()
    }
}

pub fn dispatch(engine: &mut EditEngine, intent: EditIntent) -> DispatchResult {
    tracing::trace!(target: "actions.dispatch", ?intent, "dispatch");
    match intent {
        EditIntent::Insert(text) => DispatchResult::edited(engine.apply_insert(&text)),
        EditIntent::Paste(text) => DispatchResult::edited(engine.apply_paste(&text)),
        EditIntent::Enter => DispatchResult::edited(engine.apply_enter()),
        EditIntent::Backspace => DispatchResult::edited(engine.apply_backspace()),
        EditIntent::DeleteForward => DispatchResult::edited(engine.apply_delete_forward()),
        EditIntent::Cut => match engine.cut_selection() {
            Some((text, outcome)) => DispatchResult {
                clipboard: Some(text),
                ..DispatchResult::edited(Some(outcome))
            },
            None => DispatchResult::clean(),
        },
        EditIntent::SelectAll => {
            let before = engine.selection();
            engine.select_all();
            DispatchResult::moved(before != engine.selection())
        }
        EditIntent::Move { motion, extend } => {
            DispatchResult::moved(engine.apply_motion(motion, extend))
        }
        EditIntent::CompositionStart => {
            engine.begin_composition();
            DispatchResult::clean()
        }
        EditIntent::CompositionUpdate(text) => {
            engine.update_composition(&text);
            DispatchResult::clean()
        }
        EditIntent::CompositionEnd(text) => DispatchResult::edited(engine.end_composition(&text)),
        EditIntent::CompositionCancel => {
            engine.cancel_composition();
            DispatchResult::clean()
        }
    }
}
