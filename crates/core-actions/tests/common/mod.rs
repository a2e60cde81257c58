#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{EditEngine, Position};

/// Engine over `lines` with the cursor at `(line, column)`.
pub fn engine_at(lines: &[&str], line: usize, column: usize) -> EditEngine {
    let mut engine = EditEngine::from_text(&lines.join("\n"));
    engine.set_cursor(Position::new(line, column), false);
    engine
}

pub fn lines(engine: &EditEngine) -> Vec<String> {
    engine.buffer().lines().to_vec()
}
