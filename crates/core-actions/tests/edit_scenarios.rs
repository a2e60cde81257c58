mod common;

use common::{engine_at, lines};
use core_actions::{EditIntent, EditKind, Motion, Position, dispatch};
use pretty_assertions::assert_eq;

#[test]
fn insert_mid_line() {
    let mut e = engine_at(&["function test() {", "  return 42;", "}"], 1, 2);
    let out = e.apply_insert("x").unwrap();
    assert_eq!(lines(&e), ["function test() {", "  xreturn 42;", "}"]);
    assert_eq!(e.position(), Position::new(1, 3));
    assert_eq!(out.kind, EditKind::Insert);
    assert_eq!(out.first_line, 1);
}

#[test]
fn backspace_to_empty_then_noop() {
    let mut e = engine_at(&["abc"], 0, 3);
    for _ in 0..3 {
        assert!(e.apply_backspace().is_some());
    }
    assert_eq!(lines(&e), [""]);
    assert_eq!(e.position(), Position::origin());
    let rev = e.revision();
    assert_eq!(e.apply_backspace(), None);
    assert_eq!(e.revision(), rev);
}

#[test]
fn backspace_merges_lines() {
    let mut e = engine_at(&["ab", "cd"], 1, 0);
    e.apply_backspace().unwrap();
    assert_eq!(lines(&e), ["abcd"]);
    assert_eq!(e.position(), Position::new(0, 2));
}

#[test]
fn insert_replaces_multiline_selection() {
    let mut e = engine_at(&["hello", "world"], 0, 0);
    e.select(Position::new(0, 0), Position::new(1, 2));
    e.apply_insert("X").unwrap();
    assert_eq!(lines(&e), ["Xrld"]);
    assert_eq!(e.position(), Position::new(0, 1));
    assert_eq!(e.selection(), None);
}

#[test]
fn reversed_selection_backspace() {
    let mut e = engine_at(&["hello", "world"], 0, 0);
    e.select(Position::new(1, 3), Position::new(0, 2));
    e.apply_backspace().unwrap();
    assert_eq!(lines(&e), ["held"]);
    assert_eq!(e.position(), Position::new(0, 2));
}

#[test]
fn enter_splits_and_moves_to_next_line() {
    let mut e = engine_at(&["abcd"], 0, 2);
    let out = e.apply_enter().unwrap();
    assert_eq!(out.kind, EditKind::Enter);
    assert_eq!(lines(&e), ["ab", "cd"]);
    assert_eq!(e.position(), Position::new(1, 0));
}

#[test]
fn paste_multiline_lands_after_last_piece() {
    let mut e = engine_at(&["<>"], 0, 1);
    let out = e.apply_paste("a\r\nbb\r\nccc").unwrap();
    assert_eq!(out.kind, EditKind::Paste);
    assert_eq!(lines(&e), ["<a", "bb", "ccc>"]);
    assert_eq!(e.position(), Position::new(2, 3));
}

#[test]
fn composition_commits_once_at_origin() {
    let mut e = engine_at(&["ab"], 0, 1);
    e.begin_composition();
    e.update_composition("n");
    e.update_composition("ni");
    // Raw input is suppressed while composing.
    assert_eq!(e.apply_insert("n"), None);
    assert_eq!(e.apply_backspace(), None);
    assert_eq!(lines(&e), ["ab"]);
    let rev = e.revision();
    let out = e.end_composition("你").unwrap();
    assert_eq!(out.kind, EditKind::Composition);
    assert_eq!(out.revision, rev + 1);
    assert_eq!(lines(&e), ["a你b"]);
    assert_eq!(e.position(), Position::new(0, 2));
    assert!(!e.is_composing());
}

#[test]
fn composition_commit_returns_to_captured_origin() {
    let mut e = engine_at(&["abc"], 0, 1);
    e.begin_composition();
    e.apply_motion(Motion::LineEnd, false);
    e.end_composition("Z").unwrap();
    assert_eq!(lines(&e), ["aZbc"]);
}

#[test]
fn empty_composition_commit_is_noop() {
    let mut e = engine_at(&["ab"], 0, 1);
    e.begin_composition();
    e.update_composition("x");
    assert_eq!(e.end_composition(""), None);
    assert_eq!(e.revision(), 0);
    assert!(!e.is_composing());
    assert!(e.apply_insert("y").is_some());
}

#[test]
fn composition_commit_is_nfc() {
    let mut e = engine_at(&[""], 0, 0);
    e.begin_composition();
    e.end_composition("e\u{0301}").unwrap();
    assert_eq!(lines(&e), ["\u{00E9}"]);
    assert_eq!(e.position(), Position::new(0, 1));
}

#[test]
fn cancel_composition_leaves_buffer() {
    let mut e = engine_at(&["ab"], 0, 1);
    e.update_composition("zz");
    assert!(e.cancel_composition());
    assert!(!e.cancel_composition());
    assert_eq!(lines(&e), ["ab"]);
    assert!(e.apply_insert("c").is_some());
}

#[test]
fn script_intents_deserialize() {
    let script = r#"[
        {"insert": "fn"},
        "enter",
        {"move": {"motion": "up"}},
        {"move": {"motion": "line_end", "extend": true}},
        "backspace",
        {"move": {"motion": {"page_down": 3}}}
    ]"#;
    let intents: Vec<EditIntent> = serde_json::from_str(script).unwrap();
    let mut e = engine_at(&[""], 0, 0);
    for intent in intents {
        dispatch(&mut e, intent);
    }
    assert_eq!(lines(&e), ["", ""]);
    assert_eq!(e.position(), Position::new(1, 0));
}
