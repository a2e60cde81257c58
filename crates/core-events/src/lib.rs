//! Shared event types for the editor core.
//!
//! Outward notifications flow through [`ObserverList`] after each atomic
//! mutation of a session. Time-based work (highlight refresh, completion
//! requests) is driven by [`Debouncer`], a single-slot timer polled with an
//! explicit `now` so behaviour is deterministic under test.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

mod debounce;

pub use debounce::Debouncer;

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an open document. Unique per process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf-{}", self.0)
    }
}

/// Notification emitted by an editor session.
///
/// Line and column in cursor / completion events are 1-indexed, matching what
/// a status bar or language client expects.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ContentChanged { text: String },
    CursorChanged { line: usize, column: usize },
    ScrollChanged { scroll_top: f32, visible_start: usize },
    CompletionRequested { line: usize, column: usize },
}

/// Receiver of session notifications. All methods default to no-ops; these
/// hooks must not block.
pub trait EditorObserver: Send + 'static {
    fn on_content_change(&mut self, _text: &str) {}
    fn on_cursor_change(&mut self, _line: usize, _column: usize) {}
    fn on_scroll_change(&mut self, _scroll_top: f32, _visible_start: usize) {}
    fn on_completion_request(&mut self, _line: usize, _column: usize) {}
}

/// Ordered set of observers notified in registration order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn EditorObserver>>,
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.observers.len())
            .finish()
    }
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<O: EditorObserver>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&mut self, event: &EditorEvent) {
        tracing::trace!(target: "events", ?event, observers = self.observers.len(), "emit");
        for observer in &mut self.observers {
            match event {
                EditorEvent::ContentChanged { text } => observer.on_content_change(text),
                EditorEvent::CursorChanged { line, column } => {
                    observer.on_cursor_change(*line, *column)
                }
                EditorEvent::ScrollChanged {
                    scroll_top,
                    visible_start,
                } => observer.on_scroll_change(*scroll_top, *visible_start),
                EditorEvent::CompletionRequested { line, column } => {
                    observer.on_completion_request(*line, *column)
                }
            }
        }
    }
}

/// Observer that records every event it receives. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    log: Arc<Mutex<Vec<EditorEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: EditorEvent) {
        if let Ok(mut log) = self.log.lock() {
            log.push(event);
        }
    }

    /// Copy of all events recorded so far.
    pub fn events(&self) -> Vec<EditorEvent> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Drain and return recorded events.
    pub fn take(&self) -> Vec<EditorEvent> {
        self.log
            .lock()
            .map(|mut l| std::mem::take(&mut *l))
            .unwrap_or_default()
    }

    pub fn count_where(&self, pred: impl Fn(&EditorEvent) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl EditorObserver for EventRecorder {
    fn on_content_change(&mut self, text: &str) {
        self.push(EditorEvent::ContentChanged {
            text: text.to_owned(),
        });
    }
    fn on_cursor_change(&mut self, line: usize, column: usize) {
        self.push(EditorEvent::CursorChanged { line, column });
    }
    fn on_scroll_change(&mut self, scroll_top: f32, visible_start: usize) {
        self.push(EditorEvent::ScrollChanged {
            scroll_top,
            visible_start,
        });
    }
    fn on_completion_request(&mut self, line: usize, column: usize) {
        self.push(EditorEvent::CompletionRequested { line, column });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_ids_are_unique() {
        let a = BufferId::next();
        let b = BufferId::next();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
        assert_eq!(BufferId::from_raw(7).to_string(), "buf-7");
    }

    #[test]
    fn observers_receive_events_in_order() {
        let first = EventRecorder::new();
        let second = EventRecorder::new();
        let mut list = ObserverList::new();
        list.register(first.clone());
        list.register(second.clone());
        list.emit(&EditorEvent::ContentChanged { text: "ab".into() });
        list.emit(&EditorEvent::CursorChanged { line: 1, column: 3 });
        assert_eq!(list.len(), 2);
        for rec in [first, second] {
            assert_eq!(
                rec.events(),
                vec![
                    EditorEvent::ContentChanged { text: "ab".into() },
                    EditorEvent::CursorChanged { line: 1, column: 3 },
                ]
            );
        }
    }

    #[test]
    fn default_hooks_are_noops() {
        struct Silent;
        impl EditorObserver for Silent {}
        let mut list = ObserverList::new();
        list.register(Silent);
        list.emit(&EditorEvent::ScrollChanged {
            scroll_top: 10.0,
            visible_start: 0,
        });
    }

    #[test]
    fn recorder_take_drains() {
        let rec = EventRecorder::new();
        let mut list = ObserverList::new();
        list.register(rec.clone());
        list.emit(&EditorEvent::CompletionRequested { line: 2, column: 1 });
        assert_eq!(rec.take().len(), 1);
        assert!(rec.events().is_empty());
    }
}
