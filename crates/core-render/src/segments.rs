//! Slice document-wide highlight spans into per-line render segments.

use core_syntax::{HighlightKind, HighlightSpan};
use serde::Serialize;

/// A run of text on one line; `kind == None` is plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderSegment {
    pub text: String,
    /// Start column (chars) within the line.
    pub column: usize,
    pub kind: Option<HighlightKind>,
}

impl RenderSegment {
    pub fn class(&self) -> Option<&'static str> {
        self.kind.map(HighlightKind::css_class)
    }
}

/// Segments for `line_text`, whose first char sits at absolute offset
/// `line_start`. Spans are clipped to the line; overlapping spans are clipped
/// so earlier-starting spans win; gaps become plain segments. Concatenating
/// the segment texts reproduces `line_text`.
pub fn render_segments(
    line_text: &str,
    line_start: usize,
    spans: &[HighlightSpan],
) -> Vec<RenderSegment> {
    let bytes: Vec<usize> = line_text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(line_text.len()))
        .collect();
    let len = bytes.len() - 1;
    let line_end = line_start + len;

    let mut local: Vec<(usize, usize, HighlightKind)> = spans
        .iter()
        .filter(|s| s.start < line_end && s.end > line_start)
        .map(|s| {
            (
                s.start.max(line_start) - line_start,
                s.end.min(line_end) - line_start,
                s.kind,
            )
        })
        .filter(|(s, e, _)| s < e)
        .collect();
    local.sort_by_key(|(s, _, _)| *s);

    let piece = |from: usize, to: usize, kind: Option<HighlightKind>| RenderSegment {
        text: line_text[bytes[from]..bytes[to]].to_owned(),
        column: from,
        kind,
    };
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for (start, end, kind) in local {
        let start = start.max(cursor);
        if start >= end {
            continue;
        }
        if start > cursor {
            out.push(piece(cursor, start, None));
        }
        out.push(piece(start, end, Some(kind)));
        cursor = end;
    }
    if cursor < len {
        out.push(piece(cursor, len, None));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn span(start: usize, end: usize, kind: HighlightKind) -> HighlightSpan {
        HighlightSpan::new(start, end, kind)
    }

    #[test]
    fn plain_line_is_one_segment() {
        let segs = render_segments("let x", 10, &[]);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].text, "let x");
        assert_eq!(segs[0].kind, None);
        assert!(render_segments("", 0, &[]).is_empty());
    }

    #[test]
    fn spans_are_clipped_to_line() {
        // Line "fn main" starts at absolute offset 5.
        let spans = [
            span(0, 7, HighlightKind::Comment),
            span(8, 12, HighlightKind::Function),
            span(20, 30, HighlightKind::String),
        ];
        let segs = render_segments("fn main", 5, &spans);
        let texts: Vec<_> = segs.iter().map(|s| (s.text.as_str(), s.class())).collect();
        assert_eq!(
            texts,
            [
                ("fn", Some("hl-comment")),
                (" ", None),
                ("main", Some("hl-function")),
            ]
        );
        assert_eq!(segs[2].column, 3);
    }

    #[test]
    fn overlapping_spans_do_not_duplicate_text() {
        let spans = [
            span(2, 6, HighlightKind::Type),
            span(0, 4, HighlightKind::Keyword),
        ];
        let segs = render_segments("abcdefgh", 0, &spans);
        let joined: String = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, "abcdefgh");
        assert_eq!(segs[0].kind, Some(HighlightKind::Keyword));
        assert_eq!(segs[1].text, "ef");
        assert_eq!(segs[1].kind, Some(HighlightKind::Type));
    }

    #[test]
    fn multibyte_text_slices_on_chars() {
        let segs = render_segments("日本語", 0, &[span(1, 2, HighlightKind::String)]);
        let texts: Vec<_> = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, ["日", "本", "語"]);
    }
}
