//! Editor session model.
//!
//! An [`EditorSession`] ties one open document to everything that reacts to
//! it: the edit engine, the viewport projector, the highlight scheduler and
//! its backend, the completion timer, the observer list and, optionally, an
//! undo/redo [`BufferAuthority`].
//!
//! Invariants after every public call:
//! * `scroll_top` lies in `[0, max(0, total_lines * line_height - height)]`.
//! * Applied highlight spans describe some revision of the current buffer;
//!   results for other buffers or superseded revisions are never applied.
//! * Each successful edit produced exactly one content-changed and one
//!   cursor-changed notification.
//!
//! Undo and redo are not computed here. The session asks the authority for
//! the content to show and treats the answer like new external content, after
//! checking that the document did not change while the request was out.

mod history;
mod session;

pub use history::{
    AuthorityError, BufferAuthority, EditRecord, LocalHistory, MERGE_CHAR_LIMIT, RecordKind,
    UNDO_HISTORY_MAX,
};
pub use session::{
    EditorSession, HistoryDirection, HistoryOutcome, HistoryTicket, PumpReport, SessionOptions,
};
