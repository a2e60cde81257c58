use crate::history::{AuthorityError, BufferAuthority, EditRecord, RecordKind};
use core_actions::{DispatchResult, EditEngine, EditIntent, EditKind, Position, dispatch};
use core_events::{BufferId, Debouncer, EditorEvent, EditorObserver, ObserverList};
use core_render::{
    Frame, FrameInput, MonospaceMeasure, TextMeasure, Viewport, ViewportProjector, VisibleRange,
};
use core_syntax::{
    AcceptOutcome, DocumentIdentity, HighlightError, HighlightRequest, HighlightResult,
    HighlightScheduler, HighlightSource, HighlightSpan, HighlightWorker, LanguageId,
    TreeSitterHighlighter,
};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Construction parameters for an [`EditorSession`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub line_height: f32,
    pub overscan: usize,
    pub scroll_margin: usize,
    pub cell_width: f32,
    pub container_width: f32,
    pub container_height: f32,
    pub highlight_enabled: bool,
    pub highlight_debounce: Duration,
    pub completion_enabled: bool,
    pub completion_debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            line_height: 20.0,
            overscan: 5,
            scroll_margin: 0,
            cell_width: 8.0,
            container_width: 800.0,
            container_height: 600.0,
            highlight_enabled: true,
            highlight_debounce: Duration::from_millis(150),
            completion_enabled: false,
            completion_debounce: Duration::from_millis(300),
        }
    }
}

enum HighlightBackend {
    /// The host computes spans; due requests are handed out by `pump`.
    External,
    Inline(Box<dyn HighlightSource>),
    Worker(HighlightWorker),
}

impl HighlightBackend {
    fn name(&self) -> &'static str {
        match self {
            Self::External => "external",
            Self::Inline(_) => "inline",
            Self::Worker(_) => "worker",
        }
    }
}

/// What a call to [`EditorSession::pump`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PumpReport {
    /// Snapshot due for an external highlighter.
    pub highlight_request: Option<HighlightRequest>,
    pub highlights_applied: bool,
    pub completion_requested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

/// Pending undo/redo round-trip, tied to the document it was issued against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTicket {
    pub direction: HistoryDirection,
    pub identity: DocumentIdentity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Applied { revision: u64 },
    /// The authority had nothing to undo/redo.
    NothingToDo,
    /// The document changed while the request was in flight.
    Discarded,
    Failed,
}

/// One open document with its viewport, schedulers and observers.
///
/// All methods run on the caller's thread and never block on highlighting:
/// highlight work is either computed on [`pump`](Self::pump), handed to a
/// worker thread, or returned to the host.
pub struct EditorSession {
    buffer_id: BufferId,
    language: LanguageId,
    engine: EditEngine,
    projector: ViewportProjector,
    viewport: Viewport,
    measure: Box<dyn TextMeasure>,
    highlight: HighlightScheduler,
    backend: HighlightBackend,
    /// `Some(threaded)` when the backend is the built-in tree-sitter highlighter.
    local_highlighter: Option<bool>,
    completion: Debouncer<Position>,
    completion_enabled: bool,
    observers: ObserverList,
    authority: Option<Box<dyn BufferAuthority>>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("buffer_id", &self.buffer_id)
            .field("language", &self.language)
            .field("revision", &self.engine.revision())
            .field("viewport", &self.viewport)
            .field("backend", &self.backend.name())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl EditorSession {
    pub fn new(options: SessionOptions) -> Self {
        let projector = ViewportProjector::new(options.line_height, options.overscan)
            .with_scroll_margin(options.scroll_margin);
        let mut highlight = HighlightScheduler::new(options.highlight_debounce);
        highlight.set_enabled(options.highlight_enabled);
        Self {
            buffer_id: BufferId::next(),
            language: LanguageId::default(),
            engine: EditEngine::new(),
            projector,
            viewport: Viewport::new(options.container_width, options.container_height),
            measure: Box::new(MonospaceMeasure::new(options.cell_width)),
            highlight,
            backend: HighlightBackend::External,
            local_highlighter: None,
            completion: Debouncer::new(options.completion_debounce),
            completion_enabled: options.completion_enabled,
            observers: ObserverList::new(),
            authority: None,
        }
    }

    pub fn with_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    // ---------------------------------------------------------------------
    // Wiring
    // ---------------------------------------------------------------------

    pub fn register<O: EditorObserver>(&mut self, observer: O) {
        self.observers.register(observer);
    }

    /// Attach an undo/redo authority. The current content is recorded as its
    /// starting snapshot.
    pub fn set_authority(&mut self, authority: impl BufferAuthority + 'static) {
        let mut authority: Box<dyn BufferAuthority> = Box::new(authority);
        authority.record(self.buffer_id, &self.engine.text(), EditRecord::load());
        self.authority = Some(authority);
    }

    /// Edits applied until [`end_transaction`](Self::end_transaction) undo
    /// as a single step.
    pub fn begin_transaction(&mut self) {
        if let Some(authority) = self.authority.as_mut() {
            authority.begin_transaction(self.buffer_id);
        }
    }

    pub fn end_transaction(&mut self) {
        if let Some(authority) = self.authority.as_mut() {
            authority.end_transaction(self.buffer_id);
        }
    }

    /// Compute highlights synchronously inside `pump`.
    pub fn set_highlight_source(&mut self, source: impl HighlightSource + 'static) {
        self.backend = HighlightBackend::Inline(Box::new(source));
        self.local_highlighter = None;
    }

    /// Compute highlights on a background thread.
    pub fn spawn_highlight_worker(
        &mut self,
        source: impl HighlightSource + 'static,
    ) -> Result<(), HighlightError> {
        self.backend = HighlightBackend::Worker(HighlightWorker::spawn(source)?);
        self.local_highlighter = None;
        Ok(())
    }

    /// Use the built-in tree-sitter highlighter for the current language.
    pub fn use_local_highlighter(&mut self, threaded: bool) -> Result<(), HighlightError> {
        let source = TreeSitterHighlighter::new(self.language)?;
        if threaded {
            self.spawn_highlight_worker(source)?;
        } else {
            self.set_highlight_source(source);
        }
        self.local_highlighter = Some(threaded);
        debug!(target: "model.session", language = self.language.name(), threaded, "local highlighter attached");
        Ok(())
    }

    /// Change the document language. A built-in highlighter is rebuilt for
    /// the new grammar and a refresh is queued.
    pub fn set_language(&mut self, language: LanguageId, now: Instant) -> Result<(), HighlightError> {
        if language == self.language {
            return Ok(());
        }
        self.language = language;
        self.highlight.clear();
        if let Some(threaded) = self.local_highlighter {
            self.use_local_highlighter(threaded)?;
        }
        self.request_highlight(now);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    pub fn buffer_id(&self) -> BufferId {
        self.buffer_id
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }

    pub fn engine(&self) -> &EditEngine {
        &self.engine
    }

    pub fn text(&self) -> String {
        self.engine.text()
    }

    pub fn cursor(&self) -> Position {
        self.engine.position()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn projector(&self) -> &ViewportProjector {
        &self.projector
    }

    /// Snapshot identity of the live document.
    pub fn identity(&self) -> DocumentIdentity {
        DocumentIdentity::new(self.buffer_id, self.engine.revision())
    }

    pub fn highlight_spans(&self) -> &[HighlightSpan] {
        self.highlight.spans()
    }

    pub fn highlight_scheduler(&self) -> &HighlightScheduler {
        &self.highlight
    }

    pub fn visible_range(&self) -> VisibleRange {
        self.projector.project(
            self.viewport.scroll_top,
            self.viewport.container_height,
            self.engine.buffer().line_count(),
        )
    }

    /// Earliest instant at which `pump` has timer work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.highlight.deadline(), self.completion.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ---------------------------------------------------------------------
    // Content
    // ---------------------------------------------------------------------

    /// Replace the document with externally supplied content.
    ///
    /// No [`EditorEvent::ContentChanged`] is sent: the host handed us this
    /// text and already knows it. Undo/redo responses applied through
    /// [`complete_history`](Self::complete_history) do notify, since that
    /// content comes from the authority and the host has not seen it yet.
    pub fn load(&mut self, text: &str, now: Instant) {
        let revision = self.engine.replace_content(text);
        self.completion.cancel();
        if let Some(authority) = self.authority.as_mut() {
            authority.record(self.buffer_id, text, EditRecord::load());
        }
        self.request_highlight(now);
        self.clamp_scroll();
        debug!(target: "model.session", buffer = %self.buffer_id, revision, lines = self.engine.buffer().line_count(), "content loaded");
    }

    /// Show another document. Pending highlight and completion work for the
    /// previous buffer is cancelled and its spans dropped.
    pub fn switch_buffer(
        &mut self,
        buffer_id: BufferId,
        text: &str,
        language: LanguageId,
        now: Instant,
    ) -> Result<(), HighlightError> {
        self.highlight.clear();
        self.completion.cancel();
        let previous = std::mem::replace(&mut self.buffer_id, buffer_id);
        if language != self.language {
            self.language = language;
            if let Some(threaded) = self.local_highlighter {
                self.use_local_highlighter(threaded)?;
            }
        }
        self.engine = EditEngine::with_revision(text, self.engine.revision() + 1);
        self.viewport.scroll_top = 0.0;
        self.viewport.scroll_left = 0.0;
        if let Some(authority) = self.authority.as_mut() {
            authority.record(buffer_id, text, EditRecord::load());
        }
        self.request_highlight(now);
        debug!(target: "model.session", from = %previous, to = %buffer_id, language = language.name(), "buffer switched");
        self.emit_cursor();
        self.emit_scroll();
        Ok(())
    }

    /// Apply one intent. Edits notify content and cursor exactly once each,
    /// schedule a highlight refresh and scroll the cursor into view.
    pub fn apply(&mut self, intent: EditIntent, now: Instant) -> DispatchResult {
        let before = self.engine.position();
        let had_selection = self.engine.selection().is_some();
        let result = dispatch(&mut self.engine, intent);
        if let Some(edit) = result.edit {
            let kind = match edit.kind {
                _ if had_selection => RecordKind::Other,
                EditKind::Insert | EditKind::Composition => RecordKind::Typing,
                EditKind::Backspace => RecordKind::Erasing,
                _ => RecordKind::Other,
            };
            let record = EditRecord::new(kind, before, self.engine.position());
            self.after_edit(edit.kind, record, now);
        } else if result.cursor_moved {
            self.after_cursor_move();
        }
        result
    }

    fn after_edit(&mut self, kind: EditKind, record: EditRecord, now: Instant) {
        let text = self.engine.text();
        if let Some(authority) = self.authority.as_mut() {
            authority.record(self.buffer_id, &text, record);
        }
        self.observers
            .emit(&EditorEvent::ContentChanged { text: text.clone() });
        self.emit_cursor();
        self.highlight.request(
            HighlightRequest {
                identity: self.identity(),
                text,
            },
            now,
        );
        match kind {
            EditKind::Insert | EditKind::Composition if self.completion_enabled => {
                self.completion.schedule(self.engine.position(), now);
            }
            _ => {
                self.completion.cancel();
            }
        }
        self.auto_scroll();
        trace!(target: "model.session", kind = kind.as_str(), revision = self.engine.revision(), "edit applied");
    }

    fn after_cursor_move(&mut self) {
        self.completion.cancel();
        self.emit_cursor();
        self.auto_scroll();
    }

    fn request_highlight(&mut self, now: Instant) {
        let request = HighlightRequest {
            identity: self.identity(),
            text: self.engine.text(),
        };
        self.highlight.request(request, now);
    }

    // ---------------------------------------------------------------------
    // Pointer
    // ---------------------------------------------------------------------

    /// Document position under a point in container coordinates.
    pub fn position_at(&self, x: f32, y: f32) -> Position {
        let buf = self.engine.buffer();
        let content_y = (y + self.viewport.scroll_top).max(0.0);
        let line = ((content_y / self.projector.line_height()).floor() as usize)
            .min(buf.line_count() - 1);
        let column = self
            .measure
            .column_at(buf.line(line), (x + self.viewport.scroll_left).max(0.0));
        Position::new(line, column)
    }

    pub fn mouse_down(&mut self, x: f32, y: f32, shift: bool) {
        let pos = self.position_at(x, y);
        let before = (self.engine.position(), self.engine.selection());
        self.engine.mouse_down(pos, shift);
        self.after_pointer(before);
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) {
        if !self.engine.cursor().is_dragging() {
            return;
        }
        let pos = self.position_at(x, y);
        let before = (self.engine.position(), self.engine.selection());
        self.engine.mouse_move(pos);
        self.after_pointer(before);
    }

    pub fn mouse_up(&mut self) {
        self.engine.mouse_up();
    }

    fn after_pointer(&mut self, before: (Position, Option<core_actions::Selection>)) {
        if before != (self.engine.position(), self.engine.selection()) {
            self.after_cursor_move();
        }
    }

    // ---------------------------------------------------------------------
    // Viewport
    // ---------------------------------------------------------------------

    /// Host scroll event. Returns the new visible range.
    pub fn on_scroll(&mut self, scroll_top: f32) -> VisibleRange {
        let before = self.viewport.scroll_top;
        self.viewport.scroll_top = scroll_top;
        self.projector
            .clamp_scroll(&mut self.viewport, self.engine.buffer().line_count());
        if self.viewport.scroll_top != before {
            self.emit_scroll();
        }
        self.visible_range()
    }

    pub fn set_scroll_left(&mut self, scroll_left: f32) {
        self.viewport.scroll_left = scroll_left.max(0.0);
    }

    pub fn resize(&mut self, width: f32, height: f32) -> VisibleRange {
        self.viewport.container_width = width.max(0.0);
        self.viewport.container_height = height.max(0.0);
        self.clamp_scroll();
        self.visible_range()
    }

    /// Scroll so `line` is at the top of the viewport (clamped).
    pub fn scroll_to_line(&mut self, line: usize) -> VisibleRange {
        let total = self.engine.buffer().line_count();
        if self
            .projector
            .scroll_to_line(&mut self.viewport, line, total)
        {
            debug!(target: "model.session", line, scroll_top = self.viewport.scroll_top, "scroll_to_line");
            self.emit_scroll();
        }
        self.visible_range()
    }

    fn clamp_scroll(&mut self) {
        let total = self.engine.buffer().line_count();
        if self.projector.clamp_scroll(&mut self.viewport, total) {
            self.emit_scroll();
        }
    }

    fn auto_scroll(&mut self) {
        let pos = self.engine.position();
        let total = self.engine.buffer().line_count();
        // The document may have shrunk below the current scroll offset.
        let clamped = self.projector.clamp_scroll(&mut self.viewport, total);
        let vertical = self
            .projector
            .ensure_cursor_visible(&mut self.viewport, pos.line, total)
            || clamped;
        let x = self.measure.cursor_x(self.engine.buffer().line(pos.line), pos.column);
        let caret = self.measure.width(" ");
        let horizontal = self.projector.ensure_x_visible(&mut self.viewport, x, caret);
        if vertical {
            self.emit_scroll();
        } else if horizontal {
            trace!(target: "model.session", scroll_left = self.viewport.scroll_left, "horizontal auto-scroll");
        }
    }

    pub fn frame(&self) -> Frame {
        let input = FrameInput {
            buffer: self.engine.buffer(),
            cursor: self.engine.position(),
            selection: self.engine.selection(),
            composition: self.engine.composition(),
            spans: self.highlight.span_index(),
            viewport: &self.viewport,
        };
        self.projector.frame(&input, self.measure.as_ref())
    }

    // ---------------------------------------------------------------------
    // Timers and async results
    // ---------------------------------------------------------------------

    /// Run due timers and collect finished background work.
    pub fn pump(&mut self, now: Instant) -> PumpReport {
        let mut report = PumpReport::default();
        let current = self.identity();
        match &mut self.backend {
            HighlightBackend::External => {
                report.highlight_request = self.highlight.poll(now);
            }
            HighlightBackend::Inline(source) => {
                report.highlights_applied = self.highlight.run_due(now, &mut **source, current)
                    == Some(AcceptOutcome::Applied);
            }
            HighlightBackend::Worker(worker) => {
                if let Some(request) = self.highlight.poll(now) {
                    let identity = request.identity;
                    if let Err(err) = worker.submit(request) {
                        self.highlight.fail(identity, &err);
                    }
                }
                while let Some(reply) = worker.try_recv() {
                    report.highlights_applied |= apply_reply(&mut self.highlight, reply, current);
                }
            }
        }

        if let Some(pos) = self.completion.poll(now)
            && pos == self.engine.position()
        {
            self.observers.emit(&EditorEvent::CompletionRequested {
                line: pos.line + 1,
                column: pos.column + 1,
            });
            report.completion_requested = true;
        }
        report
    }

    /// Block up to `timeout` for a worker reply. Returns true if spans were
    /// applied. Other backends return false immediately.
    pub fn wait_for_highlights(&mut self, timeout: Duration) -> bool {
        let current = self.identity();
        let HighlightBackend::Worker(worker) = &self.backend else {
            return false;
        };
        match worker.recv_timeout(timeout) {
            Some(reply) => apply_reply(&mut self.highlight, reply, current),
            None => false,
        }
    }

    /// Spans computed by an external highlighter.
    pub fn accept_highlights(&mut self, result: HighlightResult) -> AcceptOutcome {
        let current = self.identity();
        self.highlight.accept(result, current)
    }

    pub fn highlight_failed(&mut self, identity: DocumentIdentity, err: &HighlightError) {
        self.highlight.fail(identity, err);
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    pub fn begin_history(&self, direction: HistoryDirection) -> HistoryTicket {
        HistoryTicket {
            direction,
            identity: self.identity(),
        }
    }

    /// Apply an authority response for `ticket`. The response replaces the
    /// whole document unless the document changed since the ticket was issued.
    pub fn complete_history(
        &mut self,
        ticket: HistoryTicket,
        response: Result<Option<String>, AuthorityError>,
        now: Instant,
    ) -> HistoryOutcome {
        let content = match response {
            Err(err) => {
                warn!(target: "model.session", buffer = %ticket.identity.buffer_id, direction = ?ticket.direction, error = %err, "history request failed");
                return HistoryOutcome::Failed;
            }
            Ok(content) => content,
        };
        if ticket.identity != self.identity() {
            debug!(
                target: "model.session",
                ticket_revision = ticket.identity.revision,
                revision = self.engine.revision(),
                direction = ?ticket.direction,
                "discarding stale history response"
            );
            return HistoryOutcome::Discarded;
        }
        let Some(content) = content else {
            return HistoryOutcome::NothingToDo;
        };
        let revision = self.engine.replace_content(&content);
        self.completion.cancel();
        self.observers.emit(&EditorEvent::ContentChanged {
            text: self.engine.text(),
        });
        self.emit_cursor();
        self.request_highlight(now);
        self.auto_scroll();
        debug!(target: "model.session", direction = ?ticket.direction, revision, "history applied");
        HistoryOutcome::Applied { revision }
    }

    pub fn undo(&mut self, now: Instant) -> HistoryOutcome {
        self.run_history(HistoryDirection::Undo, now)
    }

    pub fn redo(&mut self, now: Instant) -> HistoryOutcome {
        self.run_history(HistoryDirection::Redo, now)
    }

    fn run_history(&mut self, direction: HistoryDirection, now: Instant) -> HistoryOutcome {
        let ticket = self.begin_history(direction);
        let response = match self.authority.as_mut() {
            Some(authority) => match direction {
                HistoryDirection::Undo => authority.undo(self.buffer_id),
                HistoryDirection::Redo => authority.redo(self.buffer_id),
            },
            None => Err(AuthorityError::Unavailable(
                "no history authority attached".to_string(),
            )),
        };
        self.complete_history(ticket, response, now)
    }

    // ---------------------------------------------------------------------
    // Notifications
    // ---------------------------------------------------------------------

    fn emit_cursor(&mut self) {
        let pos = self.engine.position();
        self.observers.emit(&EditorEvent::CursorChanged {
            line: pos.line + 1,
            column: pos.column + 1,
        });
    }

    fn emit_scroll(&mut self) {
        let visible_start = self.visible_range().start;
        self.observers.emit(&EditorEvent::ScrollChanged {
            scroll_top: self.viewport.scroll_top,
            visible_start,
        });
    }
}

fn apply_reply(
    scheduler: &mut HighlightScheduler,
    reply: core_syntax::HighlightReply,
    current: DocumentIdentity,
) -> bool {
    match reply.spans {
        Ok(spans) => {
            scheduler.accept(
                HighlightResult {
                    identity: reply.identity,
                    spans,
                },
                current,
            ) == AcceptOutcome::Applied
        }
        Err(err) => {
            scheduler.fail(reply.identity, &err);
            false
        }
    }
}
