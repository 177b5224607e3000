//! Excluded-word sets consulted while building facets.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::analysis::normalize::normalize_string;
use crate::analysis::stemmer::Stemmer;
use crate::error::Result;

/// On-disk form of an excluded-word list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludedWordsFile {
    #[serde(default)]
    pub words: Vec<String>,
}

/// Ordered set of excluded words and their stems.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedWords {
    words: BTreeSet<String>,
}

impl ExcludedWords {
    pub fn new() -> Self {
        ExcludedWords::default()
    }

    /// Build a set from raw words, adding the stemmed form of each.
    pub fn from_words<I, S>(words: I, stemmer: &dyn Stemmer) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = ExcludedWords::new();
        for word in words {
            set.insert_with_stem(word.as_ref(), stemmer);
        }
        set
    }

    /// Load a JSON `{ "words": [...] }` file.
    pub fn load_json_file<P: AsRef<Path>>(path: P, stemmer: &dyn Stemmer) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let file: ExcludedWordsFile = serde_json::from_str(&content)?;
        let set = Self::from_words(&file.words, stemmer);
        info!(
            "loaded {} excluded search terms from '{}'",
            set.len(),
            path.as_ref().display()
        );
        Ok(set)
    }

    /// Insert the normalized word and its stem. Returns how many entries were new.
    pub fn insert_with_stem(&mut self, word: &str, stemmer: &dyn Stemmer) -> usize {
        let word = normalize_string(word);
        if word.is_empty() {
            return 0;
        }

        let mut added = 0;
        if let Some(stem) = stemmer.stem_token(&word)
            && self.words.insert(stem)
        {
            added += 1;
        }
        if self.words.insert(word) {
            added += 1;
        }
        added
    }

    pub fn insert(&mut self, word: &str) -> bool {
        let word = normalize_string(word);
        !word.is_empty() && self.words.insert(word)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::stemmer::SuffixStemmer;
    use std::io::Write;

    #[test]
    fn test_words_and_stems_are_stored() {
        let set = ExcludedWords::from_words(["Running", "the", ""], &SuffixStemmer::new());

        assert!(set.contains("running"));
        assert!(set.contains("runn"));
        assert!(set.contains("the"));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"words": ["and", "colors"]}}"#).unwrap();

        let set = ExcludedWords::load_json_file(file.path(), &SuffixStemmer::new()).unwrap();
        assert!(set.contains("and"));
        assert!(set.contains("colors"));
        assert!(set.contains("color"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result =
            ExcludedWords::load_json_file("/nonexistent/words.json", &SuffixStemmer::new());
        assert!(result.is_err());
    }
}
