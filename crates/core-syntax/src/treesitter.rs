//! Local fallback highlighter backed by tree-sitter grammars.

use crate::{HighlightError, HighlightKind, HighlightSource, HighlightSpan, LanguageId, sort_spans};
use core_events::BufferId;
use streaming_iterator::StreamingIterator;
use tracing::trace;
use tree_sitter::{Parser, Query, QueryCursor};

struct Grammar {
    parser: Parser,
    query: Query,
    /// Capture index -> kind, resolved once per query.
    kinds: Vec<Option<HighlightKind>>,
}

pub struct TreeSitterHighlighter {
    language: LanguageId,
    grammar: Option<Grammar>,
}

impl std::fmt::Debug for TreeSitterHighlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSitterHighlighter")
            .field("language", &self.language)
            .finish()
    }
}

impl TreeSitterHighlighter {
    /// Plain text gets a highlighter that always yields no spans.
    pub fn new(language: LanguageId) -> Result<Self, HighlightError> {
        let grammar = match language.grammar() {
            Some((lang, source)) => {
                let mut parser = Parser::new();
                parser.set_language(&lang)?;
                let query = Query::new(&lang, source)?;
                let kinds = query
                    .capture_names()
                    .iter()
                    .map(|name| HighlightKind::from_capture_name(name))
                    .collect();
                Some(Grammar {
                    parser,
                    query,
                    kinds,
                })
            }
            None => None,
        };
        Ok(Self { language, grammar })
    }

    pub fn language(&self) -> LanguageId {
        self.language
    }
}

impl HighlightSource for TreeSitterHighlighter {
    fn get_highlights(
        &mut self,
        buffer_id: BufferId,
        text: &str,
    ) -> Result<Vec<HighlightSpan>, HighlightError> {
        let Some(grammar) = self.grammar.as_mut() else {
            return Ok(Vec::new());
        };
        let tree = grammar
            .parser
            .parse(text, None)
            .ok_or(HighlightError::ParseFailed)?;

        // Byte offset of every char, for byte -> char offset conversion.
        let char_starts: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        let to_char = |byte: usize| char_starts.partition_point(|b| *b < byte);

        let mut cursor = QueryCursor::new();
        let mut captures = cursor.captures(&grammar.query, tree.root_node(), text.as_bytes());
        let mut spans = Vec::new();
        while let Some((m, idx)) = captures.next() {
            let capture = &m.captures[*idx];
            let Some(kind) = grammar.kinds[capture.index as usize] else {
                continue;
            };
            let node = capture.node;
            let (start, end) = (to_char(node.start_byte()), to_char(node.end_byte()));
            if start < end {
                spans.push(HighlightSpan::new(start, end, kind));
            }
        }
        sort_spans(&mut spans);
        spans.dedup();
        trace!(target: "syntax.treesitter", %buffer_id, language = self.language.name(), spans = spans.len(), "highlighted");
        Ok(spans)
    }
}
