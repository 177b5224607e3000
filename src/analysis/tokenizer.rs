//! Delimiter tokenization.

use crate::analysis::normalize::{contains_alphabetic, contains_vowel, normalize_string};
use crate::analysis::stemmer::Stemmer;

/// Split `value` on any character of `delimiters`, keeping tokens of at least
/// `min_length` characters.
pub fn tokenize(value: &str, delimiters: &str, min_length: usize) -> Vec<String> {
    value
        .split(|c: char| delimiters.contains(c))
        .filter(|token| !token.is_empty() && token.chars().count() >= min_length)
        .map(str::to_string)
        .collect()
}

/// Query-side token pipeline: normalize, tokenize, normalize each token, drop
/// tokens that are too short or are not words, then stem.
///
/// Returns an empty list when nothing survives.
pub fn string_to_tokens(
    value: &str,
    min_length: usize,
    delimiters: &str,
    stemmer: &dyn Stemmer,
) -> Vec<String> {
    if min_length == 0 || delimiters.is_empty() {
        return Vec::new();
    }

    let normalized = normalize_string(value);
    if normalized.chars().count() < min_length {
        return Vec::new();
    }

    tokenize(&normalized, delimiters, min_length)
        .into_iter()
        .filter_map(|token| {
            let token = normalize_string(&token);
            if token.chars().count() < min_length {
                return None;
            }
            if !contains_vowel(&token) || !contains_alphabetic(&token) {
                return None;
            }
            stemmer.stem_token(&token)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stemmer::{IdentityStemmer, SuffixStemmer};

    #[test]
    fn test_tokenize_respects_min_length() {
        let tokens = tokenize("red|sky;at,night", "|;,", 3);
        assert_eq!(tokens, vec!["red", "sky", "night"]);

        assert!(tokenize("", " ", 1).is_empty());
        assert_eq!(tokenize("a b", " ", 1), vec!["a", "b"]);
    }

    #[test]
    fn test_string_to_tokens_filters_non_words() {
        let tokens = string_to_tokens("The 2024 Running, Dogs!", 3, " ,", &IdentityStemmer);
        assert_eq!(tokens, vec!["the", "running", "dogs"]);
    }

    #[test]
    fn test_string_to_tokens_stems() {
        let tokens = string_to_tokens("walking quickly", 3, " ", &SuffixStemmer::new());
        assert_eq!(tokens, vec!["walk", "quick"]);
    }

    #[test]
    fn test_string_to_tokens_rejects_short_input() {
        assert!(string_to_tokens("hi", 3, " ", &IdentityStemmer).is_empty());
        assert!(string_to_tokens("hello", 0, " ", &IdentityStemmer).is_empty());
    }
}
