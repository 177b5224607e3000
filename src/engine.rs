//! The engine ties the catalogs to the settings and the entity store.
//!
//! [`SearchEngine`] keeps the [`IndexRegistry`] and the [`SearchIndex`] in
//! step when indexes are created, removed or renamed, resolves attribute keys
//! through [`build_index_string`] and the geo-coordinate alias, and hands the
//! sort subsystem everything it reads: effective index settings, the stemmer
//! and the entities.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use crate::analysis::relevancy::{relevancy_key, relevancy_length_key, serialize_tokens};
use crate::analysis::{
    ExcludedWords, Stemmer, SuffixStemmer, build_index_string, normalize_string, string_to_tokens,
    tokenize,
};
use crate::config::EngineSettings;
use crate::entity::{AttributeValue, Entity, EntityStore};
use crate::error::{QuiverError, Result};
use crate::index::{RangeSearch, wildcard_length};
use crate::intersect::Intersect;
use crate::posting::{EntityUid, PostingList};
use crate::registry::{IndexRegistry, IndexType, RegisteredIndex, ResolvedSettings};
use crate::search_index::SearchIndex;
use crate::sort::SearchSort;

pub struct SearchEngine {
    settings: EngineSettings,
    registry: IndexRegistry,
    search_index: SearchIndex,
    excluded_words: Arc<ExcludedWords>,
    stemmer: Arc<dyn Stemmer>,
    entities: Arc<dyn EntityStore>,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("search_index", &self.search_index)
            .field("stemmer", &self.stemmer.name())
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    pub fn new(settings: EngineSettings, entities: Arc<dyn EntityStore>) -> Result<Self> {
        Self::with_stemmer(settings, entities, Arc::new(SuffixStemmer::new()))
    }

    pub fn with_stemmer(
        settings: EngineSettings,
        entities: Arc<dyn EntityStore>,
        stemmer: Arc<dyn Stemmer>,
    ) -> Result<Self> {
        settings.validate()?;
        let timeout = settings.lock_timeout();
        let excluded_words = ExcludedWords::from_words(&settings.excluded_words, stemmer.as_ref());

        Ok(SearchEngine {
            registry: IndexRegistry::with_timeout(timeout),
            search_index: SearchIndex::with_timeout("default", timeout),
            excluded_words: Arc::new(excluded_words),
            settings,
            stemmer,
            entities,
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn registry(&self) -> &IndexRegistry {
        &self.registry
    }

    pub fn search_index(&self) -> &SearchIndex {
        &self.search_index
    }

    pub fn excluded_words(&self) -> &Arc<ExcludedWords> {
        &self.excluded_words
    }

    pub fn stemmer(&self) -> &dyn Stemmer {
        self.stemmer.as_ref()
    }

    pub fn entities(&self) -> &dyn EntityStore {
        self.entities.as_ref()
    }

    pub fn entity(&self, uid: EntityUid) -> Option<Arc<dyn Entity>> {
        self.entities.get(uid)
    }

    pub fn max_sort_operation_memory_length(&self) -> u64 {
        self.settings.max_sort_operation_memory_length
    }

    /// Replace the engine-wide excluded words.
    pub fn set_excluded_words(&mut self, words: ExcludedWords) {
        self.excluded_words = Arc::new(words);
    }

    pub fn load_excluded_words(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let words = ExcludedWords::load_json_file(path, self.stemmer.as_ref())?;
        self.set_excluded_words(words);
        Ok(())
    }

    /// Resolve an attribute name to its registered index.
    pub fn get_index(&self, key: &str) -> Result<Arc<RegisteredIndex>> {
        let key = build_index_string(key);
        if key.is_empty() {
            warn!("rejected empty attribute name");
            return Err(QuiverError::invalid_argument("empty attribute name"));
        }
        self.registry.get(&key)
    }

    pub fn resolve_settings(&self, index: &RegisteredIndex) -> ResolvedSettings {
        index
            .settings()
            .resolve(index.index_type(), &self.settings, &self.excluded_words)
    }

    /// Register an index and create its storage.
    pub fn create_index(
        &self,
        index_type: IndexType,
        key: &str,
        name: &str,
    ) -> Result<Arc<RegisteredIndex>> {
        let key = build_index_string(key);
        self.registry.put(index_type, &key, name)?;

        if let Err(e) = self.search_index.new_index(
            index_type,
            &key,
            self.settings.min_string_length,
            self.settings.max_string_length,
        ) {
            self.registry.remove(&key)?;
            return Err(e);
        }
        self.registry.get(&key)
    }

    pub fn remove_index(&self, key: &str) -> Result<()> {
        let index = self.get_index(key)?;
        self.registry.remove(index.key())?;
        self.search_index.remove_index(index.key())
    }

    /// Move an index and its storage to a new key and display name.
    pub fn rename_index(
        &self,
        key: &str,
        new_key: &str,
        new_name: &str,
    ) -> Result<Arc<RegisteredIndex>> {
        let index = self.get_index(key)?;
        let new_key = build_index_string(new_key);
        let renamed = self
            .registry
            .reset(index.key(), index.index_type(), &new_key, new_name)?;

        if let Err(e) = self.search_index.rename_index(index.key(), &renamed) {
            self.registry
                .reset(&new_key, index.index_type(), index.key(), index.name())?;
            return Err(e);
        }
        debug!("renamed index '{}' to '{new_key}'", index.key());
        Ok(renamed)
    }

    /// Set the length window of an index. Exact and wildcard storage is
    /// re-thresholded to match.
    pub fn set_string_index_thresholds(&self, key: &str, min: usize, max: usize) -> Result<()> {
        let index = self.get_index(key)?;
        self.registry.set_string_index_thresholds(index.key(), min, max)?;
        if matches!(index.index_type(), IndexType::Exact | IndexType::Wildcard) {
            self.search_index.set_string_thresholds(index.key(), min, max)?;
        }
        Ok(())
    }

    pub fn put_string(&self, key: &str, value: &str, uid: EntityUid) -> Result<()> {
        let index = self.get_index(key)?;
        self.search_index
            .put_string(index.index_type(), index.key(), value, uid)
    }

    pub fn put_integer(&self, key: &str, value: i64, uid: EntityUid) -> Result<()> {
        let index = self.get_index(key)?;
        self.search_index
            .put_integer(index.index_type(), index.key(), value, uid)
    }

    pub fn remove_string(&self, key: &str, value: &str, uid: EntityUid) -> Result<()> {
        let index = self.get_index(key)?;
        self.search_index
            .remove_string(index.index_type(), index.key(), value, uid)
    }

    pub fn remove_integer(&self, key: &str, value: i64, uid: EntityUid) -> Result<()> {
        let index = self.get_index(key)?;
        self.search_index
            .remove_integer(index.index_type(), index.key(), value, uid)
    }

    pub fn get_string(&self, key: &str, value: &str) -> Result<Option<PostingList>> {
        let index = self.get_index(key)?;
        self.search_index
            .get_string(index.index_type(), index.key(), value)
    }

    pub fn get_range(
        &self,
        key: &str,
        search: RangeSearch,
        min: i64,
        max: i64,
    ) -> Result<Vec<EntityUid>> {
        let index = self.get_index(key)?;
        self.search_index
            .get_range(index.index_type(), index.key(), search, min, max)
    }

    /// Post every registered attribute `entity` carries. Returns how many
    /// values were posted.
    pub fn index_entity(&self, entity: &dyn Entity) -> Result<usize> {
        let mut posted = 0;
        for index in self.registry.entries()? {
            if !entity.exists(index.key()) {
                continue;
            }
            posted += match index.index_type() {
                IndexType::Range => self.index_integer(&index, entity)?,
                _ => self.index_string(&index, entity)?,
            };
        }
        Ok(posted)
    }

    fn index_integer(&self, index: &RegisteredIndex, entity: &dyn Entity) -> Result<usize> {
        let Some(value) = entity.get_integer(index.key()) else {
            return Ok(0);
        };
        self.post(
            self.search_index
                .put_integer(index.index_type(), index.key(), value, entity.uid()),
        )
    }

    fn index_string(&self, index: &RegisteredIndex, entity: &dyn Entity) -> Result<usize> {
        let Some(value) = entity.get_string(index.key()) else {
            return Ok(0);
        };
        let settings = self.resolve_settings(index);
        let (min, max) = (settings.min_string_length, settings.max_string_length);
        let mut posted = 0;

        let fits = |value: &str| {
            let length = match index.index_type() {
                IndexType::UserKey => value.chars().count(),
                _ => wildcard_length(value),
            };
            (min..=max).contains(&length)
        };

        if settings.string_indexing.full_string && fits(value.as_str()) {
            posted += self.post(self.search_index.put_string(
                index.index_type(),
                index.key(),
                &value,
                entity.uid(),
            ))?;
        }

        if settings.string_indexing.tokenized {
            let tokens = tokenize(&normalize_string(&value), &settings.delimiters, min);
            if settings.string_indexing.full_string && tokens.len() == 1 && tokens[0] == value {
                return Ok(posted);
            }
            for token in tokens.into_iter().filter(|token| fits(token.as_str())) {
                posted += self.post(self.search_index.put_string(
                    index.index_type(),
                    index.key(),
                    &token,
                    entity.uid(),
                ))?;
            }
        }
        Ok(posted)
    }

    /// Count a put, treating an already-posted uid as nothing to do.
    fn post(&self, result: Result<()>) -> Result<usize> {
        match result {
            Ok(()) => Ok(1),
            Err(QuiverError::DuplicateKey(key)) => {
                debug!("skipped duplicate posting {key}");
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Relevancy attributes to store on an entity for `value` of index `key`.
    /// `None` when the value yields no tokens.
    pub fn build_relevancy_attributes(
        &self,
        key: &str,
        value: &str,
    ) -> Result<Option<[(String, AttributeValue); 2]>> {
        let index = self.get_index(key)?;
        let tokens = string_to_tokens(
            value,
            self.settings.min_string_length,
            &self.settings.delimiters,
            self.stemmer.as_ref(),
        );
        if tokens.is_empty() {
            return Ok(None);
        }

        Ok(Some([
            (
                relevancy_key(index.key()),
                AttributeValue::Text(serialize_tokens(&tokens)),
            ),
            (
                relevancy_length_key(index.key()),
                AttributeValue::Integer(tokens.len() as i64),
            ),
        ]))
    }

    /// Sort and facet context over `intersect`'s result.
    pub fn search_sort<'a>(&'a self, intersect: &'a mut Intersect) -> SearchSort<'a> {
        SearchSort::new(self, intersect)
    }

    /// Log a one-line summary of every index.
    pub fn log_summary(&self) -> Result<()> {
        for index in self.registry.entries()? {
            let count = self
                .search_index
                .get_index_value_count(index.index_type(), index.key())?;
            info!(
                "index '{}' ({}) type {} uid {} holds {count} uids",
                index.key(),
                index.name(),
                index.index_type(),
                index.uid()
            );
        }
        Ok(())
    }
}
