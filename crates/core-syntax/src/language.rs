use std::path::Path;

/// Languages the local highlighter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LanguageId {
    Rust,
    #[default]
    PlainText,
}

impl LanguageId {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "rs" => Self::Rust,
            _ => Self::PlainText,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(Self::PlainText, Self::from_extension)
    }

    pub(crate) fn grammar(self) -> Option<(tree_sitter::Language, &'static str)> {
        match self {
            Self::Rust => Some((
                tree_sitter_rust::LANGUAGE.into(),
                tree_sitter_rust::HIGHLIGHTS_QUERY,
            )),
            Self::PlainText => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::PlainText => "plaintext",
        }
    }
}
