//! Applied spans kept sorted with a running maximum end, so range queries
//! touch only the spans near the queried window.

use crate::{HighlightSpan, sort_spans};
use std::ops::Range;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanIndex {
    spans: Vec<HighlightSpan>,
    /// `max_end[i]` is the largest `end` in `spans[..=i]`; non-decreasing.
    max_end: Vec<usize>,
}

impl SpanIndex {
    pub fn new(mut spans: Vec<HighlightSpan>) -> Self {
        sort_spans(&mut spans);
        let max_end = spans
            .iter()
            .scan(0usize, |max, s| {
                *max = (*max).max(s.end);
                Some(*max)
            })
            .collect();
        Self { spans, max_end }
    }

    pub fn as_slice(&self) -> &[HighlightSpan] {
        &self.spans
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn clear(&mut self) {
        self.spans.clear();
        self.max_end.clear();
    }

    /// Contiguous run of spans that may overlap `range`, sorted on start.
    /// Every span before the run ends at or before `range.start`; every span
    /// after it starts at or after `range.end`.
    pub fn window(&self, range: &Range<usize>) -> &[HighlightSpan] {
        let lo = self.max_end.partition_point(|&end| end <= range.start);
        let hi = self.spans.partition_point(|s| s.start < range.end);
        if lo >= hi {
            return &[];
        }
        &self.spans[lo..hi]
    }

    /// Spans overlapping `range` (half-open), sorted on start.
    pub fn in_range<'a>(
        &'a self,
        range: &Range<usize>,
    ) -> impl Iterator<Item = &'a HighlightSpan> + 'a {
        let range = range.clone();
        self.window(&range)
            .iter()
            .filter(move |s| s.overlaps(&range))
    }
}

impl From<Vec<HighlightSpan>> for SpanIndex {
    fn from(spans: Vec<HighlightSpan>) -> Self {
        Self::new(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HighlightKind;
    use proptest::prelude::*;

    fn index() -> SpanIndex {
        SpanIndex::new(vec![
            HighlightSpan::new(10, 12, HighlightKind::Number),
            HighlightSpan::new(0, 3, HighlightKind::Keyword),
            HighlightSpan::new(3, 6, HighlightKind::Function),
            HighlightSpan::new(0, 20, HighlightKind::Comment),
        ])
    }

    #[test]
    fn range_filter_is_half_open() {
        let idx = index();
        let hit: Vec<_> = idx.in_range(&(3..10)).map(|s| s.kind).collect();
        assert_eq!(hit, vec![HighlightKind::Comment, HighlightKind::Function]);
        assert_eq!(idx.in_range(&(6..6)).count(), 1);
    }

    #[test]
    fn window_skips_spans_far_from_range() {
        let idx = SpanIndex::new(
            (0..1000)
                .map(|i| HighlightSpan::new(i * 10, i * 10 + 4, HighlightKind::Keyword))
                .collect(),
        );
        let w = idx.window(&(5000..5030));
        assert_eq!(w.first().map(|s| s.start), Some(5000));
        assert_eq!(w.len(), 3);
    }

    #[test]
    fn long_span_keeps_window_open() {
        let idx = index();
        // The comment starting at 0 still covers offset 15.
        let w = idx.window(&(15..16));
        assert_eq!(w.first().map(|s| s.kind), Some(HighlightKind::Comment));
    }

    proptest! {
        #[test]
        fn window_matches_linear_filter(
            raw in proptest::collection::vec((0usize..200, 1usize..40), 0..40),
            start in 0usize..240,
            len in 0usize..60,
        ) {
            let spans: Vec<_> = raw
                .into_iter()
                .map(|(s, l)| HighlightSpan::new(s, s + l, HighlightKind::Variable))
                .collect();
            let idx = SpanIndex::new(spans.clone());
            let range = start..start + len;
            let mut expected: Vec<_> = spans.into_iter().filter(|s| s.overlaps(&range)).collect();
            sort_spans(&mut expected);
            let got: Vec<_> = idx.in_range(&range).copied().collect();
            prop_assert_eq!(got, expected);
        }
    }
}
