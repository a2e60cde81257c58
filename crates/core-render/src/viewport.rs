//! Virtual scrolling: pixel viewport → visible line range.
//!
//! Only `[start, end)` of the document is materialized per frame. The range
//! is padded by `overscan` lines on both sides so fast scrolling does not
//! expose blank rows before the next frame arrives. Line `i` sits at
//! `i * line_height` in content space; the rendered slice is shifted by
//! `start * line_height - scroll_top`.

use serde::Serialize;
use tracing::trace;

/// Scroll state of the editor surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Viewport {
    pub scroll_top: f32,
    pub scroll_left: f32,
    pub container_height: f32,
    pub container_width: f32,
}

impl Viewport {
    pub fn new(container_width: f32, container_height: f32) -> Self {
        Self {
            container_width,
            container_height,
            ..Self::default()
        }
    }
}

/// Half-open visible line range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }
    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProjector {
    line_height: f32,
    overscan: usize,
    scroll_margin: usize,
}

impl Default for ViewportProjector {
    fn default() -> Self {
        Self::new(20.0, 5)
    }
}

impl ViewportProjector {
    /// Panics unless `line_height` is finite and positive.
    pub fn new(line_height: f32, overscan: usize) -> Self {
        assert!(
            line_height.is_finite() && line_height > 0.0,
            "line height must be positive, got {line_height}"
        );
        Self {
            line_height,
            overscan,
            scroll_margin: 0,
        }
    }

    /// Lines kept between the cursor and the viewport edge on auto-scroll.
    pub fn with_scroll_margin(mut self, margin: usize) -> Self {
        self.scroll_margin = margin;
        self
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn overscan(&self) -> usize {
        self.overscan
    }

    pub fn scroll_margin(&self) -> usize {
        self.scroll_margin
    }

    pub fn line_top(&self, line: usize) -> f32 {
        line as f32 * self.line_height
    }

    pub fn content_height(&self, total_lines: usize) -> f32 {
        self.line_top(total_lines)
    }

    pub fn max_scroll_top(&self, total_lines: usize, container_height: f32) -> f32 {
        (self.content_height(total_lines) - container_height).max(0.0)
    }

    /// Whole lines that fit in the container.
    pub fn lines_per_page(&self, container_height: f32) -> usize {
        (container_height.max(0.0) / self.line_height).floor() as usize
    }

    /// Visible range for a scroll offset.
    ///
    /// `start = max(0, floor(top/lh) - overscan)`,
    /// `end = min(total, max(ceil((top+h)/lh), floor(top/lh) + 1) + overscan)`.
    /// The range always contains the first visible line when `scroll_top` is
    /// inside the document, even for a zero-height container.
    pub fn project(
        &self,
        scroll_top: f32,
        container_height: f32,
        total_lines: usize,
    ) -> VisibleRange {
        let top = scroll_top.max(0.0);
        let first = (top / self.line_height).floor() as usize;
        let last = ((top + container_height.max(0.0)) / self.line_height).ceil() as usize;
        let start = first.saturating_sub(self.overscan).min(total_lines);
        let end = (last.max(first + 1) + self.overscan).min(total_lines);
        trace!(target: "render.viewport", scroll_top, container_height, total_lines, start, end, "project");
        VisibleRange { start, end }
    }

    /// Clamp `scroll_top` into `[0, max_scroll_top]`. Returns true on change.
    pub fn clamp_scroll(&self, viewport: &mut Viewport, total_lines: usize) -> bool {
        let max = self.max_scroll_top(total_lines, viewport.container_height);
        let clamped = viewport.scroll_top.clamp(0.0, max);
        let changed = clamped != viewport.scroll_top;
        viewport.scroll_top = clamped;
        changed
    }

    /// Adjust `scroll_top` so `cursor_line` lies within `[top, top + h)`,
    /// keeping `scroll_margin` lines (at most half a page) between the cursor
    /// and the edge. Returns true when `scroll_top` changed.
    pub fn ensure_cursor_visible(
        &self,
        viewport: &mut Viewport,
        cursor_line: usize,
        total_lines: usize,
    ) -> bool {
        let h = viewport.container_height;
        if h <= 0.0 {
            return false;
        }
        let margin = self.scroll_margin.min(self.lines_per_page(h) / 2) as f32 * self.line_height;
        let cursor_top = self.line_top(cursor_line);
        let cursor_bottom = cursor_top + self.line_height;
        let top = viewport.scroll_top;
        let target = if cursor_top < top + margin {
            cursor_top - margin
        } else if cursor_bottom + margin > top + h {
            cursor_bottom + margin - h
        } else {
            top
        };
        let target = target.clamp(0.0, self.max_scroll_top(total_lines, h));
        if target == top {
            return false;
        }
        trace!(target: "render.viewport", cursor_line, from = top, to = target, "auto_scroll");
        viewport.scroll_top = target;
        true
    }

    /// Keep the caret x coordinate inside `[left, left + width)`.
    /// `caret_width` is the space reserved right of the caret when scrolling right.
    pub fn ensure_x_visible(&self, viewport: &mut Viewport, x: f32, caret_width: f32) -> bool {
        let w = viewport.container_width;
        if w <= 0.0 {
            return false;
        }
        let left = viewport.scroll_left;
        let target = if x < left {
            x
        } else if x >= left + w {
            (x + caret_width.max(1.0) - w).max(0.0)
        } else {
            left
        };
        if target == left {
            return false;
        }
        trace!(target: "render.viewport", x, from = left, to = target, "auto_scroll_x");
        viewport.scroll_left = target;
        true
    }

    /// Scroll so `line` is the first fully visible line (clamped).
    pub fn scroll_to_line(&self, viewport: &mut Viewport, line: usize, total_lines: usize) -> bool {
        let before = viewport.scroll_top;
        viewport.scroll_top = self.line_top(line.min(total_lines.saturating_sub(1)));
        self.clamp_scroll(viewport, total_lines);
        before != viewport.scroll_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_with_overscan() {
        let p = ViewportProjector::new(20.0, 5);
        assert_eq!(p.project(2000.0, 600.0, 1000), VisibleRange { start: 95, end: 135 });
    }

    #[test]
    fn clamps_at_document_edges() {
        let p = ViewportProjector::new(20.0, 5);
        assert_eq!(p.project(0.0, 600.0, 1000), VisibleRange { start: 0, end: 35 });
        assert_eq!(p.project(19_500.0, 600.0, 1000), VisibleRange { start: 970, end: 1000 });
        assert_eq!(p.project(0.0, 600.0, 3), VisibleRange { start: 0, end: 3 });
    }

    #[test]
    fn zero_height_still_yields_current_line() {
        let p = ViewportProjector::new(20.0, 0);
        let r = p.project(45.0, 0.0, 10);
        assert_eq!(r, VisibleRange { start: 2, end: 3 });
        assert!(r.contains(2));
    }

    #[test]
    fn cursor_below_scrolls_down() {
        let p = ViewportProjector::new(20.0, 0);
        let mut vp = Viewport::new(400.0, 200.0);
        assert!(p.ensure_cursor_visible(&mut vp, 15, 100));
        // Line 15 bottom edge (320) aligned to viewport bottom.
        assert_eq!(vp.scroll_top, 120.0);
        assert!(!p.ensure_cursor_visible(&mut vp, 15, 100));
    }

    #[test]
    fn cursor_above_scrolls_up() {
        let p = ViewportProjector::new(20.0, 0);
        let mut vp = Viewport::new(400.0, 200.0);
        vp.scroll_top = 500.0;
        assert!(p.ensure_cursor_visible(&mut vp, 3, 100));
        assert_eq!(vp.scroll_top, 60.0);
    }

    #[test]
    fn margin_clamped_to_half_page() {
        let p = ViewportProjector::new(10.0, 0).with_scroll_margin(50);
        let mut vp = Viewport::new(100.0, 40.0);
        // 4 lines per page -> margin 2 lines.
        assert!(p.ensure_cursor_visible(&mut vp, 2, 100));
        assert_eq!(vp.scroll_top, 10.0);
    }

    #[test]
    fn scroll_never_exceeds_content() {
        let p = ViewportProjector::new(20.0, 0);
        let mut vp = Viewport::new(400.0, 200.0);
        p.ensure_cursor_visible(&mut vp, 4, 5);
        assert_eq!(vp.scroll_top, 0.0);
        assert!(p.scroll_to_line(&mut vp, 90, 100));
        assert_eq!(vp.scroll_top, p.max_scroll_top(100, 200.0));
    }

    #[test]
    fn horizontal_follow() {
        let p = ViewportProjector::default();
        let mut vp = Viewport::new(100.0, 100.0);
        assert!(p.ensure_x_visible(&mut vp, 150.0, 8.0));
        assert_eq!(vp.scroll_left, 58.0);
        assert!(p.ensure_x_visible(&mut vp, 10.0, 8.0));
        assert_eq!(vp.scroll_left, 10.0);
        assert!(!p.ensure_x_visible(&mut vp, 50.0, 8.0));
    }
}
