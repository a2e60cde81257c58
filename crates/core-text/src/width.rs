//! Display width of a single grapheme cluster (EGC).
//!
//! All width decisions in the editor go through [`egc_width`]. The result is
//! in cells: ASCII and narrow clusters are 1, East Asian wide and emoji
//! clusters are 2. Measurement code multiplies cells by the font cell width.
//!
//! The classifier is heuristic and biased toward over-estimating emoji-like
//! composites. An extra blank cell is harmless; an under-estimate makes the
//! caret drift away from the glyph it belongs to.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    Emoji,
    /// Base + combining mark(s); true when the base is wide or pictographic.
    Combining(bool),
}

const ZWJ: char = '\u{200D}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

// Emoji blocks plus misc symbols / dingbats.
fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

fn is_wide(c: char) -> bool {
    c.width().unwrap_or(1) == 2
}

fn classify(egc: &str) -> EgcKind {
    let mut chars = egc.chars();
    let Some(first) = chars.next() else {
        return EgcKind::Narrow;
    };
    if chars.next().is_none() {
        return if first.is_ascii() {
            EgcKind::Ascii
        } else if is_extended_pictographic(first) {
            EgcKind::Emoji
        } else if is_wide(first) {
            EgcKind::Wide
        } else {
            EgcKind::Narrow
        };
    }

    let count = egc.chars().count();
    let mut pictographic = 0usize;
    let mut regional = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut any_wide = false;
    let mut base_wide: Option<bool> = None;

    for c in egc.chars() {
        pictographic += usize::from(is_extended_pictographic(c));
        regional += usize::from(is_regional_indicator(c));
        has_zwj |= c == ZWJ;
        has_skin |= is_skin_tone_modifier(c);
        has_combining |= is_combining_mark(c);
        any_wide |= is_wide(c);
        if base_wide.is_none() && !is_combining_mark(c) {
            base_wide = Some(is_extended_pictographic(c) || is_wide(c));
        }
    }

    let keycap = egc.ends_with(KEYCAP_COMBINING)
        && egc
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_digit() || c == '#' || c == '*');
    if keycap
        || (regional == 2 && count == 2)
        || (has_zwj && pictographic >= 2)
        || (pictographic >= 1 && has_skin)
        || (pictographic == 1 && !has_zwj)
    {
        return EgcKind::Emoji;
    }
    if has_combining {
        return EgcKind::Combining(base_wide.unwrap_or(false));
    }
    if any_wide {
        return EgcKind::Wide;
    }
    if pictographic > 0 {
        return EgcKind::Emoji;
    }
    EgcKind::Narrow
}

/// Display width in cells of one grapheme cluster. Empty input is 0.
///
/// The caller is responsible for segmentation; multi-cluster input is not
/// rejected, it is just classified as one unit.
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    // Gear renders narrow in most editor fonts even with VS16.
    if egc == "\u{2699}" || egc == "\u{2699}\u{FE0F}" {
        return 1;
    }
    let width = match classify(egc) {
        EgcKind::Ascii | EgcKind::Narrow => 1,
        EgcKind::Wide | EgcKind::Emoji => 2,
        EgcKind::Combining(base_wide) => {
            if base_wide {
                2
            } else {
                1
            }
        }
    };
    if width == 1
        && egc
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c))
    {
        return 2;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_cjk() {
        assert_eq!(egc_width("a"), 1);
        assert_eq!(egc_width("界"), 2);
        assert_eq!(egc_width(""), 0);
    }

    #[test]
    fn emoji_forms_are_wide() {
        assert_eq!(egc_width("😀"), 2);
        assert_eq!(egc_width("🇺🇸"), 2);
        assert_eq!(egc_width("1️⃣"), 2);
        assert_eq!(egc_width("2\u{20E3}"), 2);
        assert_eq!(egc_width("👨‍👩‍👧‍👦"), 2);
        assert_eq!(egc_width("👍🏻"), 2);
        assert_eq!(egc_width("✈️"), 2);
    }

    #[test]
    fn lone_regional_indicator_widens() {
        assert_eq!(egc_width("🇺"), 2);
    }

    #[test]
    fn combining_inherits_base_width() {
        assert_eq!(egc_width("e\u{0301}"), 1);
        assert_eq!(egc_width("界\u{0301}"), 2);
    }

    #[test]
    fn gear_is_narrow() {
        assert_eq!(egc_width("⚙"), 1);
        assert_eq!(egc_width("⚙️"), 1);
    }
}
