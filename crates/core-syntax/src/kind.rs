use serde::{Deserialize, Serialize};

/// Token classes produced by highlighters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightKind {
    Keyword,
    KeywordControl,
    KeywordFunction,
    KeywordOperator,
    KeywordReturn,
    String,
    StringSpecial,
    Number,
    Comment,
    CommentDoc,
    Function,
    FunctionMethod,
    FunctionBuiltin,
    FunctionMacro,
    Type,
    TypeBuiltin,
    Constructor,
    Variable,
    VariableBuiltin,
    VariableParameter,
    Property,
    Operator,
    Punctuation,
    PunctuationBracket,
    PunctuationDelimiter,
    Constant,
    ConstantBuiltin,
    Label,
    Namespace,
    Attribute,
    Tag,
    Embedded,
    Error,
}

impl HighlightKind {
    /// Map a tree-sitter capture name. Unknown dotted names fall back to their
    /// parent (`keyword.coroutine` → `keyword`).
    pub fn from_capture_name(name: &str) -> Option<Self> {
        let mut candidate = name;
        loop {
            if let Some(kind) = Self::exact(candidate) {
                return Some(kind);
            }
            candidate = &candidate[..candidate.rfind('.')?];
        }
    }

    fn exact(name: &str) -> Option<Self> {
        Some(match name {
            "keyword" => Self::Keyword,
            "keyword.control" | "keyword.conditional" | "keyword.repeat" => Self::KeywordControl,
            "keyword.function" => Self::KeywordFunction,
            "keyword.operator" => Self::KeywordOperator,
            "keyword.return" => Self::KeywordReturn,
            "string" => Self::String,
            "string.special" | "string.escape" | "string.regex" | "escape" => Self::StringSpecial,
            "number" | "float" => Self::Number,
            "comment" => Self::Comment,
            "comment.documentation" | "comment.doc" => Self::CommentDoc,
            "function" | "function.call" => Self::Function,
            "function.method" | "method" => Self::FunctionMethod,
            "function.builtin" => Self::FunctionBuiltin,
            "function.macro" | "macro" => Self::FunctionMacro,
            "type" | "type.definition" => Self::Type,
            "type.builtin" => Self::TypeBuiltin,
            "constructor" => Self::Constructor,
            "variable" => Self::Variable,
            "variable.builtin" | "self" => Self::VariableBuiltin,
            "variable.parameter" | "parameter" => Self::VariableParameter,
            "property" | "field" => Self::Property,
            "operator" => Self::Operator,
            "punctuation" => Self::Punctuation,
            "punctuation.bracket" => Self::PunctuationBracket,
            "punctuation.delimiter" => Self::PunctuationDelimiter,
            "constant" => Self::Constant,
            "constant.builtin" | "boolean" => Self::ConstantBuiltin,
            "label" => Self::Label,
            "namespace" | "module" => Self::Namespace,
            "attribute" => Self::Attribute,
            "tag" => Self::Tag,
            "embedded" => Self::Embedded,
            "error" => Self::Error,
            _ => return None,
        })
    }

    /// Stylesheet class for hosts that render with CSS.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Keyword => "hl-keyword",
            Self::KeywordControl => "hl-keyword-control",
            Self::KeywordFunction => "hl-keyword-function",
            Self::KeywordOperator => "hl-keyword-operator",
            Self::KeywordReturn => "hl-keyword-return",
            Self::String => "hl-string",
            Self::StringSpecial => "hl-string-special",
            Self::Number => "hl-number",
            Self::Comment => "hl-comment",
            Self::CommentDoc => "hl-comment-doc",
            Self::Function => "hl-function",
            Self::FunctionMethod => "hl-function-method",
            Self::FunctionBuiltin => "hl-function-builtin",
            Self::FunctionMacro => "hl-function-macro",
            Self::Type => "hl-type",
            Self::TypeBuiltin => "hl-type-builtin",
            Self::Constructor => "hl-constructor",
            Self::Variable => "hl-variable",
            Self::VariableBuiltin => "hl-variable-builtin",
            Self::VariableParameter => "hl-variable-parameter",
            Self::Property => "hl-property",
            Self::Operator => "hl-operator",
            Self::Punctuation => "hl-punctuation",
            Self::PunctuationBracket => "hl-punctuation-bracket",
            Self::PunctuationDelimiter => "hl-punctuation-delimiter",
            Self::Constant => "hl-constant",
            Self::ConstantBuiltin => "hl-constant-builtin",
            Self::Label => "hl-label",
            Self::Namespace => "hl-namespace",
            Self::Attribute => "hl-attribute",
            Self::Tag => "hl-tag",
            Self::Embedded => "hl-embedded",
            Self::Error => "hl-error",
        }
    }
}
