//! Per-index overrides of the engine-wide defaults.

use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::ExcludedWords;
use crate::config::EngineSettings;
use crate::registry::IndexType;

/// Which forms of a string value are indexed and faceted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringIndexing {
    pub full_string: bool,
    pub tokenized: bool,
}

impl StringIndexing {
    /// Full strings are always indexed; user keys are never tokenized.
    pub fn default_for(index_type: IndexType) -> Self {
        StringIndexing {
            full_string: true,
            tokenized: index_type != IndexType::UserKey,
        }
    }
}

/// Overrides carried by one registered index. `None` inherits the engine
/// setting.
#[derive(Debug, Clone, Default)]
pub struct IndexSettings {
    pub string_thresholds: Option<(usize, usize)>,
    pub delimiters: Option<String>,
    pub excluded_words: Option<Arc<ExcludedWords>>,
    pub excluded_words_file: Option<PathBuf>,
    pub string_indexing: Option<StringIndexing>,
}

impl IndexSettings {
    pub fn new() -> Self {
        IndexSettings::default()
    }

    pub fn has_overrides(&self) -> bool {
        self.string_thresholds.is_some()
            || self.delimiters.is_some()
            || self.excluded_words.is_some()
            || self.string_indexing.is_some()
    }

    pub fn resolve(
        &self,
        index_type: IndexType,
        engine: &EngineSettings,
        engine_excluded: &Arc<ExcludedWords>,
    ) -> ResolvedSettings {
        let (min_string_length, max_string_length) = self
            .string_thresholds
            .unwrap_or((engine.min_string_length, engine.max_string_length));

        ResolvedSettings {
            min_string_length,
            max_string_length,
            delimiters: self
                .delimiters
                .clone()
                .unwrap_or_else(|| engine.delimiters.clone()),
            excluded_words: self
                .excluded_words
                .clone()
                .unwrap_or_else(|| Arc::clone(engine_excluded)),
            string_indexing: self
                .string_indexing
                .unwrap_or_else(|| StringIndexing::default_for(index_type)),
        }
    }
}

/// Effective settings of one index after falling back to the engine.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub min_string_length: usize,
    pub max_string_length: usize,
    pub delimiters: String,
    pub excluded_words: Arc<ExcludedWords>,
    pub string_indexing: StringIndexing,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::IdentityStemmer;

    #[test]
    fn test_resolve_inherits_engine_defaults() {
        let engine = EngineSettings::default();
        let excluded = Arc::new(ExcludedWords::from_words(["the"], &IdentityStemmer));

        let resolved = IndexSettings::new().resolve(IndexType::UserKey, &engine, &excluded);

        assert_eq!(resolved.min_string_length, 3);
        assert_eq!(resolved.max_string_length, 18);
        assert_eq!(resolved.delimiters, engine.delimiters);
        assert!(resolved.excluded_words.contains("the"));
        assert!(resolved.string_indexing.full_string);
        assert!(!resolved.string_indexing.tokenized);
    }

    #[test]
    fn test_resolve_prefers_overrides() {
        let engine = EngineSettings::default();
        let excluded = Arc::new(ExcludedWords::new());
        let settings = IndexSettings {
            string_thresholds: Some((1, 4)),
            delimiters: Some(",".to_string()),
            excluded_words: Some(Arc::new(ExcludedWords::from_words(["red"], &IdentityStemmer))),
            excluded_words_file: None,
            string_indexing: Some(StringIndexing {
                full_string: false,
                tokenized: true,
            }),
        };

        let resolved = settings.resolve(IndexType::Exact, &engine, &excluded);

        assert!(settings.has_overrides());
        assert_eq!((resolved.min_string_length, resolved.max_string_length), (1, 4));
        assert_eq!(resolved.delimiters, ",");
        assert!(resolved.excluded_words.contains("red"));
        assert!(!resolved.string_indexing.full_string);
    }
}
