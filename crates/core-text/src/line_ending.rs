//! Line-ending detection and normalization to LF.
//!
//! The buffer stores lines split on `\n` only. External content and inserted
//! text are normalized here first; the detected majority style is reported so
//! a host can restore it when writing the document back out.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    /// LF-only content.
    pub normalized: String,
    /// Majority style (ties prefer CRLF, then LF, then CR).
    pub original: LineEnding,
    pub had_trailing_newline: bool,
    /// More than one style seen.
    pub mixed: bool,
}

pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let bytes = input.as_bytes();
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                crlf += 1;
                i += 2;
                continue;
            }
            b'\r' => cr += 1,
            b'\n' => lf += 1,
            _ => {}
        }
        i += 1;
    }

    let mut original = LineEnding::Lf;
    let mut max = 0usize;
    for (style, count) in [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ] {
        if count > max {
            max = count;
            original = style;
        }
    }
    let mixed = [crlf, lf, cr].iter().filter(|c| **c > 0).count() > 1;
    let had_trailing_newline = input.ends_with('\n') || input.ends_with('\r');

    if crlf == 0 && cr == 0 {
        return NormalizedText {
            normalized: input.to_owned(),
            original,
            had_trailing_newline,
            mixed,
        };
    }

    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    NormalizedText {
        normalized,
        original,
        had_trailing_newline,
        mixed,
    }
}
