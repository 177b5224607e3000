//! Stemming of normalized tokens.

/// Trait for stemming algorithms.
pub trait Stemmer: Send + Sync {
    /// Stem a word to its root form.
    fn stem(&self, word: &str) -> String;

    /// Get the name of this stemmer.
    fn name(&self) -> &'static str;

    /// Stem a token, yielding `None` when nothing is left of it.
    fn stem_token(&self, token: &str) -> Option<String> {
        let stemmed = self.stem(token);
        if stemmed.is_empty() {
            None
        } else {
            Some(stemmed)
        }
    }
}

/// English suffixes stripped by [`SuffixStemmer`], longest first.
const ENGLISH_SUFFIXES: &[&str] = &[
    "tion", "sion", "able", "ible", "ment", "ness", "ing", "est", "ies", "ied", "ful", "ed", "er",
    "ly", "es", "s",
];

/// Stemmer that strips the longest matching English suffix.
///
/// Words of three characters or fewer are returned lowercased but otherwise
/// unchanged, and a suffix is only removed when at least three characters of
/// stem remain.
#[derive(Debug, Clone)]
pub struct SuffixStemmer {
    suffixes: Vec<String>,
}

impl SuffixStemmer {
    pub fn new() -> Self {
        Self::with_suffixes(ENGLISH_SUFFIXES.iter().map(|s| s.to_string()).collect())
    }

    /// Create a stemmer over a custom suffix list.
    pub fn with_suffixes(mut suffixes: Vec<String>) -> Self {
        suffixes.sort_by_key(|suffix| std::cmp::Reverse(suffix.len()));
        SuffixStemmer { suffixes }
    }
}

impl Default for SuffixStemmer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stemmer for SuffixStemmer {
    fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();

        if word.len() <= 3 {
            return word;
        }

        self.suffixes
            .iter()
            .find(|suffix| word.len() > suffix.len() + 2 && word.ends_with(suffix.as_str()))
            .map(|suffix| word[..word.len() - suffix.len()].to_string())
            .unwrap_or(word)
    }

    fn name(&self) -> &'static str {
        "suffix"
    }
}

/// Identity stemmer that returns words unchanged.
#[derive(Debug, Clone, Default)]
pub struct IdentityStemmer;

impl Stemmer for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}
