//! NFC normalization for committed input.
//!
//! IME commits can arrive decomposed (`e` + U+0301). Inserting the NFC form
//! keeps column arithmetic stable: one precomposed char instead of two.

use unicode_normalization::UnicodeNormalization;

/// NFC form of `input`.
pub fn nfc(input: &str) -> String {
    input.nfc().collect()
}
