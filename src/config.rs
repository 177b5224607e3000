//! Engine-wide defaults and per-index configuration sections.
//!
//! [`EngineSettings`] holds the defaults every index inherits unless it
//! overrides them. [`IndexSettingsConfig`] is the serialized form of one
//! registered index and the overrides it carries.
//!
//! # Example
//!
//! ```
//! use quiver::config::EngineSettings;
//!
//! let settings: EngineSettings = serde_json::from_str(r#"{"min_string_length": 2}"#).unwrap();
//! assert_eq!(settings.min_string_length, 2);
//! assert_eq!(settings.max_string_length, 18);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};
use crate::registry::IndexType;

pub const DEFAULT_MIN_STRING_LENGTH: usize = 3;
pub const DEFAULT_MAX_STRING_LENGTH: usize = 18;
pub const DEFAULT_DELIMITERS: &str = " |~,;:.][)(}{*@!&-_";

/// Exclusive upper bound for any configured maximum string length.
pub const MAX_STRING_INDEX_LENGTH: usize = 1024;

pub const DEFAULT_MAX_SORT_OPERATION_MEMORY_LENGTH: u64 = 8_388_608;
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Shortest string or token that is indexed.
    pub min_string_length: usize,
    /// Longest string or token that is indexed.
    pub max_string_length: usize,
    /// Characters separating tokens.
    pub delimiters: String,
    /// Catalog lock wait before an operation reports a lock failure.
    pub lock_timeout_ms: u64,
    /// Budget for the per-uid keys a composite sort precomputes.
    pub max_sort_operation_memory_length: u64,
    /// Words never counted as facets unless an index overrides the list.
    pub excluded_words: Vec<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            min_string_length: DEFAULT_MIN_STRING_LENGTH,
            max_string_length: DEFAULT_MAX_STRING_LENGTH,
            delimiters: DEFAULT_DELIMITERS.to_string(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            max_sort_operation_memory_length: DEFAULT_MAX_SORT_OPERATION_MEMORY_LENGTH,
            excluded_words: Vec::new(),
        }
    }
}

impl EngineSettings {
    pub fn validate(&self) -> Result<()> {
        validate_string_thresholds(self.min_string_length, self.max_string_length)?;
        validate_delimiters(&self.delimiters)?;
        Ok(())
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Thresholds must satisfy `1 <= min <= max < MAX_STRING_INDEX_LENGTH`.
pub fn validate_string_thresholds(min: usize, max: usize) -> Result<()> {
    if min < 1 || max < 1 || min > max || max >= MAX_STRING_INDEX_LENGTH {
        return Err(QuiverError::invalid_argument(format!(
            "string thresholds min {min} max {max} are out of range"
        )));
    }
    Ok(())
}

pub fn validate_delimiters(delimiters: &str) -> Result<()> {
    if delimiters.is_empty() {
        return Err(QuiverError::invalid_argument("delimiters must not be empty"));
    }
    Ok(())
}

/// Serialized description of one registered index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettingsConfig {
    #[serde(rename = "type")]
    pub index_type: IndexType,
    #[serde(default)]
    pub uid: u64,
    pub key: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_string_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_string_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_delimiters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_words_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_index_full_string: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_index_tokenized_string: Option<bool>,
}

impl IndexSettingsConfig {
    pub fn new(index_type: IndexType, key: impl Into<String>, name: impl Into<String>) -> Self {
        IndexSettingsConfig {
            index_type,
            uid: 0,
            key: key.into(),
            name: name.into(),
            min_string_length: None,
            max_string_length: None,
            string_delimiters: None,
            excluded_words_file: None,
            is_index_full_string: None,
            is_index_tokenized_string: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.min_string_length, 3);
        assert_eq!(settings.max_string_length, 18);
        assert_eq!(settings.delimiters, " |~,;:.][)(}{*@!&-_");
        assert_eq!(settings.max_sort_operation_memory_length, 8_388_608);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_threshold_validation() {
        assert!(validate_string_thresholds(1, 1).is_ok());
        assert!(validate_string_thresholds(0, 5).is_err());
        assert!(validate_string_thresholds(6, 5).is_err());
        assert!(validate_string_thresholds(3, 1023).is_ok());
        assert!(validate_string_thresholds(3, 1024).is_err());
        assert!(validate_delimiters("").is_err());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");

        let settings = EngineSettings {
            min_string_length: 2,
            excluded_words: vec!["the".to_string()],
            ..EngineSettings::default()
        };
        settings.to_json_file(&path).unwrap();

        assert_eq!(EngineSettings::from_json_file(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        fs::write(&path, r#"{"min_string_length": 20}"#).unwrap();

        assert!(matches!(
            EngineSettings::from_json_file(&path),
            Err(QuiverError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_index_section_skips_inherited_fields() {
        let section = IndexSettingsConfig::new(IndexType::UserKey, "sku", "SKU");
        let json = serde_json::to_string(&section).unwrap();

        assert_eq!(json, r#"{"type":"User Key","uid":0,"key":"sku","name":"SKU"}"#);
        let parsed: IndexSettingsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, section);
    }
}
