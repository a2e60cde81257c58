//! In-progress IME composition.
//!
//! The origin is captured when composition starts and stays fixed while the
//! preedit text changes. The preedit is display-only; it never reaches the
//! buffer until the composition is committed.

use core_text::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionState {
    origin: Position,
    preedit: String,
}

impl CompositionState {
    pub fn new(origin: Position) -> Self {
        Self {
            origin,
            preedit: String::new(),
        }
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    pub fn update(&mut self, text: &str) {
        self.preedit.clear();
        self.preedit.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_replaces_preedit_and_keeps_origin() {
        let mut c = CompositionState::new(Position::new(3, 1));
        c.update("ni");
        c.update("你");
        assert_eq!(c.preedit(), "你");
        assert_eq!(c.origin(), Position::new(3, 1));
    }
}
