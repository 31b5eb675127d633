use lazy_static::lazy_static;
use regex::Regex;

use crate::Token;

lazy_static! {
    static ref RE: Regex = Regex::new(r"[A-Za-z0-9]+").expect("valid regex");
}

/// Tokenize a line of text into lowercased ASCII alphanumeric words.
///
/// Any run of characters other than ASCII letters and digits separates tokens,
/// so `"don't"` yields `["don", "t"]` and non-ASCII letters are dropped.
pub fn tokenize(text: &str) -> Vec<Token> {
    RE.find_iter(text)
        .map(|mat| mat.as_str().to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        assert_eq!(tokenize("Cats, dogs! 123"), vec!["cats", "dogs", "123"]);
    }

    #[test]
    fn empty_and_separator_only_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,.;-- !!").is_empty());
    }

    #[test]
    fn non_ascii_letters_split_words() {
        assert_eq!(tokenize("café_au-lait"), vec!["caf", "au", "lait"]);
    }
}
