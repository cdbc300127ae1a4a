//! Diacritic-insensitive text folding for title/artist search
//!
//! Folding = lowercase, canonical decomposition (NFD), removal of nonspacing
//! marks (Mn), canonical recomposition (NFC). "Saí de Casa" folds to
//! "sai de casa". Spacing (Mc) and enclosing (Me) marks are kept.

use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

/// Lowercase and strip diacritics
pub fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| get_general_category(*c) != GeneralCategory::NonspacingMark)
        .nfc()
        .collect()
}

/// Fold then split on whitespace
pub fn tokenize(text: &str) -> Vec<String> {
    fold(text).split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents() {
        assert_eq!(fold("Saí de Casa"), "sai de casa");
        assert_eq!(fold("CORAÇÃO"), "coracao");
        assert_eq!(fold("Não Há"), "nao ha");
    }

    #[test]
    fn test_fold_decomposed_input() {
        // "e" followed by U+0301 COMBINING ACUTE ACCENT
        assert_eq!(fold("Cafe\u{0301}"), "cafe");
    }

    #[test]
    fn test_fold_keeps_spacing_and_enclosing_marks() {
        // U+0903 DEVANAGARI SIGN VISARGA (Mc), U+20DD COMBINING ENCLOSING CIRCLE (Me)
        assert_eq!(fold("\u{0915}\u{0903} 1\u{20DD}"), "\u{0915}\u{0903} 1\u{20DD}");
        // U+093F DEVANAGARI VOWEL SIGN I (Mc) survives, U+094D VIRAMA (Mn) does not
        assert_eq!(fold("\u{0915}\u{093F}\u{094D}"), "\u{0915}\u{093F}");
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  No dia   em que\teu saí "), vec!["no", "dia", "em", "que", "eu", "sai"]);
        assert!(tokenize("   ").is_empty());
    }
}
