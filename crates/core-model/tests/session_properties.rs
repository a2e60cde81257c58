//! Notification and viewport invariants under random input.

use core_actions::{EditIntent, Motion};
use core_events::{EditorEvent, EventRecorder};
use core_model::{EditorSession, SessionOptions};
use proptest::prelude::*;
use std::time::Instant;

#[derive(Debug, Clone)]
enum Step {
    Intent(EditIntent),
    Scroll(f32),
    Resize(f32),
}

fn step() -> impl Strategy<Value = Step> {
    let motion = prop_oneof![
        Just(Motion::Up),
        Just(Motion::Down),
        Just(Motion::Right),
        Just(Motion::DocumentEnd),
        (1usize..30).prop_map(Motion::PageDown),
        (1usize..30).prop_map(Motion::PageUp),
    ];
    prop_oneof![
        "[a-z]{1,3}".prop_map(|t| Step::Intent(EditIntent::Insert(t))),
        "[a-z\n]{1,12}".prop_map(|t| Step::Intent(EditIntent::Paste(t))),
        Just(Step::Intent(EditIntent::Enter)),
        Just(Step::Intent(EditIntent::Backspace)),
        Just(Step::Intent(EditIntent::SelectAll)),
        Just(Step::Intent(EditIntent::Cut)),
        (motion, any::<bool>())
            .prop_map(|(motion, extend)| Step::Intent(EditIntent::Move { motion, extend })),
        (-100.0f32..5000.0).prop_map(Step::Scroll),
        (0.0f32..400.0).prop_map(Step::Resize),
    ]
}

proptest! {
    #[test]
    fn each_edit_notifies_once_and_scroll_stays_in_bounds(
        steps in proptest::collection::vec(step(), 1..60)
    ) {
        let now = Instant::now();
        let mut s = EditorSession::new(SessionOptions {
            container_height: 120.0,
            ..SessionOptions::default()
        });
        s.load(&vec!["text"; 40].join("\n"), now);
        let rec = EventRecorder::new();
        s.register(rec.clone());

        for step in steps {
            rec.take();
            match step {
                Step::Intent(intent) => {
                    let r = s.apply(intent, now);
                    let events = rec.take();
                    let contents = events
                        .iter()
                        .filter(|e| matches!(e, EditorEvent::ContentChanged { .. }))
                        .count();
                    let cursors = events
                        .iter()
                        .filter(|e| matches!(e, EditorEvent::CursorChanged { .. }))
                        .count();
                    prop_assert_eq!(contents, usize::from(r.is_edit()));
                    prop_assert_eq!(cursors, usize::from(r.cursor_moved));
                    if let Some(EditorEvent::ContentChanged { text }) = events.first() {
                        prop_assert_eq!(text, &s.text());
                    }
                }
                Step::Scroll(top) => {
                    s.on_scroll(top);
                }
                Step::Resize(height) => {
                    s.resize(300.0, height);
                }
            }
            let vp = s.viewport();
            let total = s.engine().buffer().line_count();
            let max = (total as f32 * 20.0 - vp.container_height).max(0.0);
            prop_assert!(vp.scroll_top >= 0.0 && vp.scroll_top <= max);
            let range = s.visible_range();
            prop_assert!(range.end <= total);
            prop_assert!(range.start <= range.end);
        }
    }
}
