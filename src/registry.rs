//! Catalog of registered indexes.
//!
//! The registry maps attribute keys to [`RegisteredIndex`] metadata: the index
//! type, its uid, a display name and the settings it overrides. The catalog
//! itself sits behind a [`CatalogLock`]; each entry's settings have their own
//! mutex so settings on different indexes can change concurrently with catalog
//! readers.
//!
//! Numbered geo-coordinate keys (`latitude002`, `longitude017`) resolve to the
//! canonical `latitude` / `longitude` index unless a literal entry exists.

pub mod settings;

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use log::{debug, warn};
use parking_lot::{Mutex, MutexGuard};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::analysis::{ExcludedWords, Stemmer};
use crate::config::{IndexSettingsConfig, validate_delimiters, validate_string_thresholds};
use crate::error::{QuiverError, Result};
use crate::ordered::OrderedIndex;
use crate::sync::{CatalogLock, DEFAULT_LOCK_TIMEOUT};

pub use settings::{IndexSettings, ResolvedSettings, StringIndexing};

/// Identifier the registry assigns to an index. Unrelated to entity uids.
pub type IndexUid = u64;

static GEO_COORD_KEY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(latitude|longitude)[0-9]+$").ok());

/// Storage strategy of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    Exact,
    Wildcard,
    Range,
    UserKey,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Exact => "Exact",
            IndexType::Wildcard => "Wildcard",
            IndexType::Range => "Range",
            IndexType::UserKey => "User Key",
        }
    }

    /// Types whose values are strings.
    pub fn is_string(&self) -> bool {
        !matches!(self, IndexType::Range)
    }
}

impl fmt::Display for IndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndexType {
    type Err = QuiverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(IndexType::Exact),
            "wildcard" => Ok(IndexType::Wildcard),
            "range" => Ok(IndexType::Range),
            "user key" | "userkey" | "user_key" => Ok(IndexType::UserKey),
            _ => Err(QuiverError::invalid_argument(format!(
                "unknown index type '{s}'"
            ))),
        }
    }
}

impl Serialize for IndexType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IndexType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Metadata of one registered index.
#[derive(Debug)]
pub struct RegisteredIndex {
    index_type: IndexType,
    uid: IndexUid,
    key: String,
    name: String,
    settings: Mutex<IndexSettings>,
}

impl RegisteredIndex {
    fn new(index_type: IndexType, uid: IndexUid, key: String, name: String) -> Self {
        RegisteredIndex {
            index_type,
            uid,
            key,
            name,
            settings: Mutex::new(IndexSettings::new()),
        }
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn uid(&self) -> IndexUid {
        self.uid
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock this index's settings.
    pub fn settings(&self) -> MutexGuard<'_, IndexSettings> {
        self.settings.lock()
    }

    pub fn settings_snapshot(&self) -> IndexSettings {
        self.settings.lock().clone()
    }
}

#[derive(Debug, Default)]
struct Catalog {
    entries: OrderedIndex<String, Arc<RegisteredIndex>>,
    uid_counter: IndexUid,
}

#[derive(Debug)]
pub struct IndexRegistry {
    catalog: CatalogLock<Catalog>,
}

impl Default for IndexRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexRegistry {
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        IndexRegistry {
            catalog: CatalogLock::with_timeout("index registry", Catalog::default(), timeout),
        }
    }

    /// Register a new index and return the uid assigned to it.
    pub fn put(&self, index_type: IndexType, key: &str, name: &str) -> Result<IndexUid> {
        check_key(key)?;
        check_name(name)?;

        let mut catalog = self.catalog.write()?;
        if catalog.entries.contains(key) {
            warn!("index '{key}' is already registered");
            return Err(QuiverError::duplicate_key(key));
        }

        let uid = catalog.uid_counter;
        let entry = RegisteredIndex::new(index_type, uid, key.to_string(), name.to_string());
        catalog.entries.put(key.to_string(), Arc::new(entry))?;
        catalog.uid_counter += 1;

        debug!("registered {index_type} index '{key}' ({name}) as uid {uid}");
        Ok(uid)
    }

    pub fn get(&self, key: &str) -> Result<Arc<RegisteredIndex>> {
        check_key(key)?;

        // Numbered geo keys always resolve to the canonical coordinate index.
        let lookup = geo_coord_alias(key).unwrap_or(key);
        let catalog = self.catalog.read()?;
        catalog
            .entries
            .get(lookup)
            .map(Arc::clone)
            .ok_or_else(|| QuiverError::not_found(format!("index '{key}'")))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.catalog.read()?.entries.contains(key))
    }

    pub fn remove(&self, key: &str) -> Result<Arc<RegisteredIndex>> {
        check_key(key)?;

        let mut catalog = self.catalog.write()?;
        let entry = catalog
            .entries
            .remove(key)
            .map_err(|_| QuiverError::not_found(format!("index '{key}'")))?;

        debug!("removed index '{key}' uid {}", entry.uid);
        Ok(entry)
    }

    /// Replace the entry under `key` with a fresh one of `new_type` under
    /// `new_key`, keeping its uid. Settings overrides are discarded.
    pub fn reset(
        &self,
        key: &str,
        new_type: IndexType,
        new_key: &str,
        new_name: &str,
    ) -> Result<Arc<RegisteredIndex>> {
        check_key(key)?;
        check_key(new_key)?;
        check_name(new_name)?;

        let mut catalog = self.catalog.write()?;
        let uid = catalog
            .entries
            .get(key)
            .map(|entry| entry.uid)
            .ok_or_else(|| QuiverError::not_found(format!("index '{key}'")))?;
        if new_key != key && catalog.entries.contains(new_key) {
            return Err(QuiverError::duplicate_key(new_key));
        }

        catalog.entries.remove(key)?;
        let entry = Arc::new(RegisteredIndex::new(
            new_type,
            uid,
            new_key.to_string(),
            new_name.to_string(),
        ));
        catalog.entries.put(new_key.to_string(), Arc::clone(&entry))?;

        debug!("reset index '{key}' to {new_type} index '{new_key}' ({new_name}) uid {uid}");
        Ok(entry)
    }

    pub fn set_string_index_thresholds(&self, key: &str, min: usize, max: usize) -> Result<()> {
        validate_string_thresholds(min, max)?;
        let entry = self.get(key)?;
        entry.settings().string_thresholds = Some((min, max));
        Ok(())
    }

    pub fn set_string_delimiters(&self, key: &str, delimiters: &str) -> Result<()> {
        validate_delimiters(delimiters)?;
        let entry = self.get(key)?;
        entry.settings().delimiters = Some(delimiters.to_string());
        Ok(())
    }

    /// Load an excluded-word file and make it this index's list.
    pub fn load_excluded_words(
        &self,
        key: &str,
        path: impl AsRef<Path>,
        stemmer: &dyn Stemmer,
    ) -> Result<()> {
        let entry = self.get(key)?;
        let words = ExcludedWords::load_json_file(path.as_ref(), stemmer)?;

        let mut settings = entry.settings();
        settings.excluded_words = Some(Arc::new(words));
        settings.excluded_words_file = Some(path.as_ref().to_path_buf());
        Ok(())
    }

    pub fn set_excluded_words(&self, key: &str, words: ExcludedWords) -> Result<()> {
        let entry = self.get(key)?;
        let mut settings = entry.settings();
        settings.excluded_words = Some(Arc::new(words));
        settings.excluded_words_file = None;
        Ok(())
    }

    pub fn set_string_indexing(&self, key: &str, full_string: bool, tokenized: bool) -> Result<()> {
        let entry = self.get(key)?;
        entry.settings().string_indexing = Some(StringIndexing {
            full_string,
            tokenized,
        });
        Ok(())
    }

    /// Export an index and the settings it overrides.
    pub fn update_config_context(&self, key: &str) -> Result<IndexSettingsConfig> {
        let entry = self.get(key)?;
        let settings = entry.settings_snapshot();

        let mut config = IndexSettingsConfig::new(entry.index_type, &entry.key, &entry.name);
        config.uid = entry.uid;
        if let Some((min, max)) = settings.string_thresholds {
            config.min_string_length = Some(min);
            config.max_string_length = Some(max);
        }
        config.string_delimiters = settings.delimiters;
        config.excluded_words_file = settings.excluded_words_file;
        if let Some(indexing) = settings.string_indexing {
            config.is_index_full_string = Some(indexing.full_string);
            config.is_index_tokenized_string = Some(indexing.tokenized);
        }
        Ok(config)
    }

    /// Apply every override present in `config` to the index under `key`.
    pub fn update_settings_from_config(
        &self,
        key: &str,
        config: &IndexSettingsConfig,
        stemmer: &dyn Stemmer,
    ) -> Result<()> {
        if let (Some(min), Some(max)) = (config.min_string_length, config.max_string_length) {
            self.set_string_index_thresholds(key, min, max)?;
        }
        if let Some(delimiters) = &config.string_delimiters {
            self.set_string_delimiters(key, delimiters)?;
        }
        if let Some(path) = &config.excluded_words_file {
            self.load_excluded_words(key, path, stemmer)?;
        }
        if config.is_index_full_string.is_some() || config.is_index_tokenized_string.is_some() {
            let defaults = StringIndexing::default_for(config.index_type);
            self.set_string_indexing(
                key,
                config.is_index_full_string.unwrap_or(defaults.full_string),
                config
                    .is_index_tokenized_string
                    .unwrap_or(defaults.tokenized),
            )?;
        }
        Ok(())
    }

    /// Whether a writer currently holds the catalog.
    pub fn is_locked(&self) -> bool {
        self.catalog.is_locked()
    }

    /// Whether any reader currently holds the catalog.
    pub fn is_read_locked(&self) -> bool {
        self.catalog.is_read_locked()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.catalog.read()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self.catalog.read()?.entries.keys().cloned().collect())
    }

    /// Every registered index in key order.
    pub fn entries(&self) -> Result<Vec<Arc<RegisteredIndex>>> {
        Ok(self.catalog.read()?.entries.values().cloned().collect())
    }
}

/// Canonical key for a numbered geo-coordinate key.
pub fn geo_coord_alias(key: &str) -> Option<&'static str> {
    let captures = GEO_COORD_KEY.as_ref()?.captures(key)?;
    match captures.get(1)?.as_str() {
        "latitude" => Some("latitude"),
        "longitude" => Some("longitude"),
        _ => None,
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        warn!("rejected empty index key");
        return Err(QuiverError::invalid_argument("empty index key"));
    }
    Ok(())
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        warn!("rejected empty index name");
        return Err(QuiverError::invalid_argument("empty index name"));
    }
    Ok(())
}
