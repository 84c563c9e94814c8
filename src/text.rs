//! Text cleanup helpers for extracted fragments.
//!
//! PDF layout engines break words at line ends with a hyphen or soft hyphen
//! and leave uneven space runs between fragments. These helpers undo both so
//! downstream consumers see rejoined words and single spaces.

use once_cell::sync::Lazy;
use regex::Regex;

/// A word character followed by a hyphen or soft hyphen and whitespace:
/// the tail of a line-wrapped word.
static PDF_HYPHEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)[\x{AD}\-]\s").unwrap());

static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Collapse runs of spaces into a single space.
pub fn remove_multispace(text: &str) -> String {
    MULTI_SPACE.replace_all(text, " ").to_string()
}

/// Remove hyphenation line breaks so split words rejoin.
///
/// A hyphen (or U+00AD soft hyphen) that follows a word character and is
/// itself followed by whitespace is deleted along with the whitespace.
pub fn remove_hyphenation(text: &str) -> String {
    PDF_HYPHEN.replace_all(text, "$1").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_multispace() {
        assert_eq!(remove_multispace("a  b   c"), "a b c");
        assert_eq!(remove_multispace("already clean"), "already clean");
        assert_eq!(remove_multispace(""), "");
    }

    #[test]
    fn test_remove_hyphenation() {
        assert_eq!(remove_hyphenation("exam- ple"), "example");
        assert_eq!(remove_hyphenation("exam\u{AD} ple"), "example");
        assert_eq!(remove_hyphenation("exam-\nple"), "example");
    }

    #[test]
    fn test_hyphenation_requires_word_char() {
        // A dash that does not follow a word character is punctuation, not
        // a line wrap.
        assert_eq!(remove_hyphenation("a - b"), "a - b");
    }

    #[test]
    fn test_hyphenation_keeps_plain_hyphens() {
        assert_eq!(remove_hyphenation("well-known"), "well-known");
    }
}
