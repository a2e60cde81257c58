//! Line-oriented text buffer.
//!
//! The document is an ordered `Vec<String>` of lines stored without their
//! newline. An empty document is a single empty line, so `lines.len() >= 1`
//! holds after every public call.
//!
//! Columns are counted in Unicode scalar values (chars) of a line. Horizontal
//! navigation and backspace step over whole grapheme clusters (see
//! [`grapheme`]), so a cursor produced by the editor never lands inside a
//! combining sequence or emoji cluster.
//!
//! Bounds policy: every mutating call takes [`Position`]s the caller derived
//! from this buffer. A position outside the buffer is a programming error and
//! panics with a message naming the offending position. Nothing is clamped
//! silently.

use tracing::trace;

pub mod line_ending;
pub mod segment;
pub mod width;

pub use line_ending::{LineEnding, NormalizedText, normalize_line_endings};
pub use width::egc_width;

/// A zero-indexed `(line, column)` location in a [`LineBuffer`].
///
/// Ordering compares `line` first, then `column` (field order of the derive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
    pub const fn origin() -> Self {
        Self { line: 0, column: 0 }
    }
}

/// Document storage: one `String` per line, no trailing newline per line.
///
/// `line_starts[i]` is the absolute char offset of line `i` in the joined
/// document, kept in step with `lines` by every mutation so offset lookups
/// do not walk the lines above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    line_starts: Vec<usize>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            line_starts: vec![0],
        }
    }
}

/// Byte offset of char `column` within `line` (or `line.len()` at end of line).
pub fn byte_offset(line: &str, column: usize) -> usize {
    line.char_indices()
        .nth(column)
        .map_or(line.len(), |(idx, _)| idx)
}

/// Number of chars in `line` (the maximum valid column).
pub fn char_len(line: &str) -> usize {
    line.chars().count()
}

impl LineBuffer {
    /// Build a buffer from external content, normalizing CRLF / CR to LF.
    pub fn from_text(text: &str) -> Self {
        let norm = normalize_line_endings(text);
        let lines = norm.normalized.split('\n').map(str::to_owned).collect();
        Self::indexed(lines)
    }

    /// Build a buffer directly from line strings. An empty iterator yields one empty line.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        debug_assert!(
            lines.iter().all(|l| !l.contains('\n')),
            "lines must not embed line breaks"
        );
        Self::indexed(lines)
    }

    fn indexed(lines: Vec<String>) -> Self {
        let mut buf = Self {
            lines,
            line_starts: vec![0],
        };
        buf.reindex_from(0);
        buf
    }

    /// Rebuild `line_starts` for every line after `line`. Starts up to and
    /// including `line` must still be valid.
    fn reindex_from(&mut self, line: usize) {
        self.line_starts.truncate(line + 1);
        let mut offset = self.line_starts[line];
        for l in &self.lines[line..self.lines.len() - 1] {
            offset += char_len(l) + 1;
            self.line_starts.push(offset);
        }
    }

    /// `line` changed length by `delta` chars without changing the line count.
    fn shift_after(&mut self, line: usize, delta: isize) {
        if delta == 0 {
            return;
        }
        for start in &mut self.line_starts[line + 1..] {
            *start = start.saturating_add_signed(delta);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line content without newline. Panics when `idx` is out of range.
    pub fn line(&self, idx: usize) -> &str {
        assert!(
            idx < self.lines.len(),
            "line {idx} out of range for buffer of {} lines",
            self.lines.len()
        );
        &self.lines[idx]
    }

    /// Length of a line in columns (chars).
    pub fn line_len(&self, idx: usize) -> usize {
        char_len(self.line(idx))
    }

    /// Last valid position in the document.
    pub fn end_position(&self) -> Position {
        let last = self.lines.len() - 1;
        Position::new(last, self.line_len(last))
    }

    /// Full document joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Total length in chars of the joined document.
    pub fn len_chars(&self) -> usize {
        let last = self.lines.len() - 1;
        self.line_starts[last] + self.line_len(last)
    }

    /// Replace the whole document (external content, undo/redo response).
    pub fn replace_all(&mut self, text: &str) {
        *self = Self::from_text(text);
        trace!(target: "text.buffer", lines = self.lines.len(), "replace_all");
    }

    /// Returns true when `pos` addresses a valid location in this buffer.
    pub fn contains(&self, pos: Position) -> bool {
        pos.line < self.lines.len() && pos.column <= char_len(&self.lines[pos.line])
    }

    /// Clamp a position into the buffer. Used after wholesale replacement only;
    /// edit paths assert instead.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.lines.len() - 1);
        Position::new(line, pos.column.min(self.line_len(line)))
    }

    fn check(&self, pos: Position) {
        assert!(
            self.contains(pos),
            "position {pos:?} outside buffer ({} lines)",
            self.lines.len()
        );
    }

    /// Absolute char offset of `pos` in the joined document.
    pub fn char_offset(&self, pos: Position) -> usize {
        self.check(pos);
        self.line_starts[pos.line] + pos.column
    }

    /// Half-open char range `[start, end)` covered by `line` (newline excluded).
    pub fn line_char_range(&self, line: usize) -> std::ops::Range<usize> {
        let start = self.char_offset(Position::new(line, 0));
        start..start + self.line_len(line)
    }

    /// Position for an absolute char offset; offsets past the end map to the end.
    pub fn position_at_offset(&self, offset: usize) -> Position {
        // line_starts[0] == 0, so at least one start is <= offset.
        let line = self.line_starts.partition_point(|&s| s <= offset) - 1;
        let column = offset - self.line_starts[line];
        if column > self.line_len(line) {
            return self.end_position();
        }
        Position::new(line, column)
    }

    /// Insert `text` at `at`, returning the position just after the inserted text.
    ///
    /// Text without line breaks is spliced into the target line. Text with line
    /// breaks replaces the target line with `prefix + first`, the middle pieces
    /// verbatim, and `last + suffix`; the returned column is the length of the
    /// last piece.
    pub fn insert(&mut self, at: Position, text: &str) -> Position {
        self.check(at);
        if text.is_empty() {
            return at;
        }
        let normalized = normalize_line_endings(text).normalized;
        let line = &mut self.lines[at.line];
        let split = byte_offset(line, at.column);

        if !normalized.contains('\n') {
            line.insert_str(split, &normalized);
            let added = char_len(&normalized);
            let end = Position::new(at.line, at.column + added);
            self.shift_after(at.line, added as isize);
            trace!(target: "text.buffer", op = "insert", line = at.line, from = at.column, to = end.column, "edit");
            return end;
        }

        let suffix = line.split_off(split);
        let mut pieces = normalized.split('\n');
        line.push_str(pieces.next().unwrap_or_default());
        let mut tail: Vec<String> = pieces.map(str::to_owned).collect();
        let end_column = tail.last().map_or(0, |l| char_len(l));
        match tail.last_mut() {
            Some(last) => last.push_str(&suffix),
            None => line.push_str(&suffix),
        }
        let end = Position::new(at.line + tail.len(), end_column);
        let inserted = tail.len();
        self.lines.splice(at.line + 1..at.line + 1, tail);
        self.reindex_from(at.line);
        trace!(target: "text.buffer", op = "insert_multiline", line = at.line, inserted_lines = inserted, end_line = end.line, end_column = end.column, "edit");
        end
    }

    /// Backspace at `at`: removes the character cluster before the column, or
    /// merges the line into the previous one at column 0. No-op at `{0,0}`.
    pub fn delete_backward(&mut self, at: Position) -> Position {
        self.check(at);
        if at.column == 0 {
            if at.line == 0 {
                return at;
            }
            let current = self.lines.remove(at.line);
            let prev = &mut self.lines[at.line - 1];
            let merge_column = char_len(prev);
            prev.push_str(&current);
            self.reindex_from(at.line - 1);
            trace!(target: "text.buffer", op = "merge_backward", line = at.line, merge_column, "edit");
            return Position::new(at.line - 1, merge_column);
        }
        let line = &mut self.lines[at.line];
        let end = byte_offset(line, at.column);
        let start = grapheme::prev_boundary(line, end);
        let removed = char_len(&line[start..end]);
        line.replace_range(start..end, "");
        self.shift_after(at.line, -(removed as isize));
        trace!(target: "text.buffer", op = "delete_backward", line = at.line, column = at.column, removed, "edit");
        Position::new(at.line, at.column - removed)
    }

    /// Delete key at `at`: removes the cluster after the column, or joins the
    /// next line at end of line. No-op at the end of the document.
    pub fn delete_forward(&mut self, at: Position) -> Position {
        self.check(at);
        let len = self.line_len(at.line);
        if at.column == len {
            if at.line + 1 == self.lines.len() {
                return at;
            }
            let next = self.lines.remove(at.line + 1);
            self.lines[at.line].push_str(&next);
            self.reindex_from(at.line);
            trace!(target: "text.buffer", op = "join_forward", line = at.line, "edit");
            return at;
        }
        let line = &mut self.lines[at.line];
        let start = byte_offset(line, at.column);
        let end = grapheme::next_boundary(line, start);
        let removed = char_len(&line[start..end]);
        line.replace_range(start..end, "");
        self.shift_after(at.line, -(removed as isize));
        trace!(target: "text.buffer", op = "delete_forward", line = at.line, column = at.column, "edit");
        at
    }

    /// Delete the text between `a` and `b` in either order, returning the
    /// (normalized) start position.
    pub fn delete_range(&mut self, a: Position, b: Position) -> Position {
        self.check(a);
        self.check(b);
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        if start == end {
            return start;
        }
        if start.line == end.line {
            let line = &mut self.lines[start.line];
            let s = byte_offset(line, start.column);
            let e = byte_offset(line, end.column);
            line.replace_range(s..e, "");
            self.shift_after(start.line, -((end.column - start.column) as isize));
        } else {
            let last = &self.lines[end.line];
            let suffix = last[byte_offset(last, end.column)..].to_owned();
            let head = &mut self.lines[start.line];
            head.truncate(byte_offset(head, start.column));
            head.push_str(&suffix);
            self.lines.drain(start.line + 1..=end.line);
            self.reindex_from(start.line);
        }
        trace!(target: "text.buffer", op = "delete_range", start_line = start.line, start_column = start.column, end_line = end.line, end_column = end.column, "edit");
        start
    }

    /// Text between `a` and `b` (either order), lines joined with `\n`.
    pub fn slice(&self, a: Position, b: Position) -> String {
        self.check(a);
        self.check(b);
        let (start, end) = if b < a { (b, a) } else { (a, b) };
        if start.line == end.line {
            let line = &self.lines[start.line];
            return line[byte_offset(line, start.column)..byte_offset(line, end.column)]
                .to_owned();
        }
        let first = &self.lines[start.line];
        let mut out = first[byte_offset(first, start.column)..].to_owned();
        for line in &self.lines[start.line + 1..end.line] {
            out.push('\n');
            out.push_str(line);
        }
        let last = &self.lines[end.line];
        out.push('\n');
        out.push_str(&last[..byte_offset(last, end.column)]);
        out
    }
}

/// Grapheme helpers operating on a single line.
///
/// Byte-based functions take and return byte offsets on char boundaries;
/// column-based functions take and return char columns.
pub mod grapheme {
    use crate::byte_offset;
    use unicode_segmentation::UnicodeSegmentation;

    /// Previous grapheme boundary (0 if already at or below the first boundary).
    pub fn prev_boundary(line: &str, byte: usize) -> usize {
        if byte == 0 || byte > line.len() {
            return 0;
        }
        let mut last = 0;
        for (idx, _) in line.grapheme_indices(true) {
            if idx >= byte {
                break;
            }
            last = idx;
        }
        last
    }

    /// Next grapheme boundary (`line.len()` at or beyond end).
    pub fn next_boundary(line: &str, byte: usize) -> usize {
        if byte >= line.len() {
            return line.len();
        }
        for (idx, _) in line.grapheme_indices(true) {
            if idx > byte {
                return idx;
            }
        }
        line.len()
    }

    /// Column of the cluster boundary before `column`.
    pub fn prev_column(line: &str, column: usize) -> usize {
        let byte = byte_offset(line, column);
        line[..prev_boundary(line, byte)].chars().count()
    }

    /// Column of the cluster boundary after `column`.
    pub fn next_column(line: &str, column: usize) -> usize {
        let byte = byte_offset(line, column);
        line[..next_boundary(line, byte)].chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().copied())
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        let b = LineBuffer::from_text("");
        assert_eq!(b.lines(), &[String::new()]);
        assert_eq!(b.text(), "");
        assert_eq!(LineBuffer::default(), b);
    }

    #[test]
    fn from_text_normalizes_crlf() {
        let b = LineBuffer::from_text("a\r\nb\rc\n");
        assert_eq!(b.lines(), &["a", "b", "c", ""]);
    }

    #[test]
    fn insert_plain_text_mid_line() {
        let mut b = buf(&["function test() {", "  return 42;", "}"]);
        let end = b.insert(Position::new(1, 2), "x");
        assert_eq!(b.line(1), "  xreturn 42;");
        assert_eq!(end, Position::new(1, 3));
        assert_eq!(b.line(0), "function test() {");
    }

    #[test]
    fn insert_multiline_into_empty_buffer() {
        let mut b = buf(&[""]);
        let end = b.insert(Position::origin(), "a\nb\nc");
        assert_eq!(b.lines(), &["a", "b", "c"]);
        assert_eq!(end, Position::new(2, 1));
    }

    #[test]
    fn insert_newline_splits_line() {
        let mut b = buf(&["abcd"]);
        let end = b.insert(Position::new(0, 2), "\n");
        assert_eq!(b.lines(), &["ab", "cd"]);
        assert_eq!(end, Position::new(1, 0));
    }

    #[test]
    fn insert_multiline_keeps_prefix_and_suffix() {
        let mut b = buf(&["head", "PREFIX|SUFFIX", "tail"]);
        let end = b.insert(Position::new(1, 7), "one\ntwo\nthree");
        assert_eq!(
            b.lines(),
            &["head", "PREFIX|one", "two", "threeSUFFIX", "tail"]
        );
        assert_eq!(end, Position::new(3, 5));
    }

    #[test]
    fn insert_counts_chars_not_bytes() {
        let mut b = buf(&["ab"]);
        let end = b.insert(Position::new(0, 1), "日本");
        assert_eq!(b.line(0), "a日本b");
        assert_eq!(end, Position::new(0, 3));
    }

    #[test]
    fn backspace_at_document_start_is_noop() {
        let mut b = buf(&["abc"]);
        let end = b.delete_backward(Position::origin());
        assert_eq!(end, Position::origin());
        assert_eq!(b.lines(), &["abc"]);
    }

    #[test]
    fn backspace_merges_lines() {
        let mut b = buf(&["ab", "cd"]);
        let end = b.delete_backward(Position::new(1, 0));
        assert_eq!(b.lines(), &["abcd"]);
        assert_eq!(end, Position::new(0, 2));
    }

    #[test]
    fn backspace_removes_whole_cluster() {
        let mut b = buf(&["ae\u{0301}x"]);
        let end = b.delete_backward(Position::new(0, 3));
        assert_eq!(b.line(0), "ax");
        assert_eq!(end, Position::new(0, 1));
    }

    #[test]
    fn delete_forward_joins_next_line() {
        let mut b = buf(&["ab", "cd"]);
        let end = b.delete_forward(Position::new(0, 2));
        assert_eq!(b.lines(), &["abcd"]);
        assert_eq!(end, Position::new(0, 2));
        let end = b.delete_forward(Position::new(0, 4));
        assert_eq!(end, Position::new(0, 4));
        assert_eq!(b.lines(), &["abcd"]);
    }

    #[test]
    fn delete_range_same_line_and_reversed() {
        let mut a = buf(&["hello world"]);
        let mut b = a.clone();
        let ea = a.delete_range(Position::new(0, 2), Position::new(0, 7));
        let eb = b.delete_range(Position::new(0, 7), Position::new(0, 2));
        assert_eq!(a, b);
        assert_eq!(ea, eb);
        assert_eq!(a.line(0), "heorld");
    }

    #[test]
    fn delete_range_multiline_merges_edges() {
        let mut b = buf(&["hello", "world"]);
        let end = b.delete_range(Position::new(1, 2), Position::new(0, 0));
        assert_eq!(b.lines(), &["rld"]);
        assert_eq!(end, Position::origin());
    }

    #[test]
    fn slice_spans_lines() {
        let b = buf(&["hello", "big", "world"]);
        assert_eq!(b.slice(Position::new(0, 3), Position::new(2, 2)), "lo\nbig\nwo");
        assert_eq!(b.slice(Position::new(1, 1), Position::new(1, 3)), "ig");
    }

    #[test]
    fn offsets_round_trip() {
        let b = buf(&["ab", "", "cde"]);
        assert_eq!(b.len_chars(), 7);
        assert_eq!(b.char_offset(Position::new(2, 1)), 5);
        assert_eq!(b.position_at_offset(5), Position::new(2, 1));
        assert_eq!(b.position_at_offset(3), Position::new(1, 0));
        assert_eq!(b.position_at_offset(99), Position::new(2, 3));
        assert_eq!(b.line_char_range(2), 4..7);
    }

    #[test]
    #[should_panic(expected = "outside buffer")]
    fn out_of_range_position_panics() {
        let mut b = buf(&["abc"]);
        b.insert(Position::new(3, 0), "x");
    }

    #[test]
    #[should_panic(expected = "outside buffer")]
    fn column_past_line_end_panics() {
        let mut b = buf(&["abc"]);
        b.delete_backward(Position::new(0, 4));
    }

    #[test]
    fn grapheme_columns_skip_clusters() {
        let s = "a😀e\u{0301}b";
        assert_eq!(grapheme::next_column(s, 0), 1);
        assert_eq!(grapheme::next_column(s, 1), 2);
        assert_eq!(grapheme::next_column(s, 2), 4);
        assert_eq!(grapheme::prev_column(s, 4), 2);
    }
}
