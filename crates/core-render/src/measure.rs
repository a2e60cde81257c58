//! Text measurement seam between the editor core and the host's font stack.

use core_text::{byte_offset, egc_width};
use unicode_segmentation::UnicodeSegmentation;

pub trait TextMeasure {
    /// Rendered width of `text` in pixels.
    fn width(&self, text: &str) -> f32;

    /// Caret x for `column` (chars) within `line`.
    fn cursor_x(&self, line: &str, column: usize) -> f32 {
        self.width(&line[..byte_offset(line, column)])
    }

    /// Column of the grapheme boundary nearest to `x` within `line`.
    fn column_at(&self, line: &str, x: f32) -> usize {
        let mut left = 0.0f32;
        let mut column = 0usize;
        for g in line.graphemes(true) {
            let w = self.width(g);
            if x < left + w / 2.0 {
                return column;
            }
            left += w;
            column += g.chars().count();
        }
        column
    }
}

/// Fixed-pitch measurement: display cells × `cell_width`. Wide clusters count
/// as two cells; a tab counts as `tab_width` cells.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    cell_width: f32,
    tab_width: usize,
}

impl Default for MonospaceMeasure {
    fn default() -> Self {
        Self::new(8.0)
    }
}

impl MonospaceMeasure {
    pub fn new(cell_width: f32) -> Self {
        Self {
            cell_width,
            tab_width: 4,
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    pub fn cell_width(&self) -> f32 {
        self.cell_width
    }

    /// Display cells of `text`.
    pub fn cells(&self, text: &str) -> usize {
        text.graphemes(true)
            .map(|g| {
                if g == "\t" {
                    self.tab_width
                } else {
                    egc_width(g) as usize
                }
            })
            .sum()
    }
}

impl TextMeasure for MonospaceMeasure {
    fn width(&self, text: &str) -> f32 {
        self.cells(text) as f32 * self.cell_width
    }
}
