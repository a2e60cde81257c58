//! Frame snapshot: everything a host needs to paint the visible slice.

use crate::{
    RenderSegment, TextMeasure, Viewport, ViewportProjector, VisibleRange, render_segments,
};
use core_state::{CompositionState, Position, Selection};
use core_syntax::SpanIndex;
use core_text::{LineBuffer, byte_offset};
use serde::Serialize;

/// Inputs borrowed from the session for one frame.
pub struct FrameInput<'a> {
    pub buffer: &'a LineBuffer,
    pub cursor: Position,
    pub selection: Option<Selection>,
    pub composition: Option<&'a CompositionState>,
    /// Document-wide applied spans.
    pub spans: &'a SpanIndex,
    pub viewport: &'a Viewport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameLine {
    /// 1-indexed gutter number.
    pub number: usize,
    /// Top edge in content space.
    pub top: f32,
    pub segments: Vec<RenderSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CursorGeometry {
    pub line: usize,
    pub column: usize,
    pub x: f32,
    pub y: f32,
    pub height: f32,
    /// Cursor line is inside the rendered range.
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SelectionRect {
    pub line: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Preedit text drawn inline at the composition origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositionOverlay {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub range: VisibleRange,
    /// Translation applied to the rendered slice: `start * lh - scroll_top`.
    pub content_offset: f32,
    pub content_height: f32,
    pub scroll_left: f32,
    pub lines: Vec<FrameLine>,
    pub cursor: CursorGeometry,
    pub selection: Vec<SelectionRect>,
    pub composition: Option<CompositionOverlay>,
}

impl ViewportProjector {
    /// Assemble the frame for the current viewport.
    pub fn frame(&self, input: &FrameInput<'_>, measure: &dyn TextMeasure) -> Frame {
        let buf = input.buffer;
        let vp = input.viewport;
        let total = buf.line_count();
        let range = self.project(vp.scroll_top, vp.container_height, total);
        let lh = self.line_height();

        let mut lines = Vec::with_capacity(range.len());
        let visible_chars = if range.is_empty() {
            0..0
        } else {
            buf.line_char_range(range.start).start..buf.line_char_range(range.end - 1).end
        };
        let window = input.spans.window(&visible_chars);
        let mut offset = visible_chars.start;
        for idx in range.iter() {
            let text = buf.line(idx);
            let line_end = offset + buf.line_len(idx);
            let candidates = &window[..window.partition_point(|s| s.start < line_end)];
            lines.push(FrameLine {
                number: idx + 1,
                top: self.line_top(idx),
                segments: render_segments(text, offset, candidates),
            });
            offset = line_end + 1;
        }

        let cursor_line = buf.line(input.cursor.line);
        let cursor = CursorGeometry {
            line: input.cursor.line,
            column: input.cursor.column,
            x: measure.cursor_x(cursor_line, input.cursor.column),
            y: self.line_top(input.cursor.line),
            height: lh,
            visible: range.contains(input.cursor.line),
        };

        let selection = input
            .selection
            .map(|sel| selection_rects(self, buf, &sel, range, measure))
            .unwrap_or_default();

        let composition = input
            .composition
            .filter(|c| !c.preedit().is_empty())
            .map(|c| {
                let origin = buf.clamp(c.origin());
                CompositionOverlay {
                    x: measure.cursor_x(buf.line(origin.line), origin.column),
                    y: self.line_top(origin.line),
                    text: c.preedit().to_owned(),
                }
            });

        Frame {
            range,
            content_offset: self.line_top(range.start) - vp.scroll_top,
            content_height: self.content_height(total),
            scroll_left: vp.scroll_left,
            lines,
            cursor,
            selection,
            composition,
        }
    }
}

fn selection_rects(
    projector: &ViewportProjector,
    buf: &LineBuffer,
    sel: &Selection,
    range: VisibleRange,
    measure: &dyn TextMeasure,
) -> Vec<SelectionRect> {
    let end_line = sel.end().line;
    range
        .iter()
        .filter_map(|line| {
            let text = buf.line(line);
            let (from, to) = sel.columns_on_line(line, buf.line_len(line))?;
            let x = measure.cursor_x(text, from);
            let mut width = measure.width(&text[byte_offset(text, from)..byte_offset(text, to)]);
            // Selected line break shows as one blank cell.
            if line != end_line {
                width += measure.width(" ");
            }
            Some(SelectionRect {
                line,
                x,
                y: projector.line_top(line),
                width,
                height: projector.line_height(),
            })
        })
        .collect()
}
