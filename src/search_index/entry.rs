//! Storage of one indexed attribute.

use crate::error::{QuiverError, Result};
use crate::index::{RangeIndex, RangeSearch, WildcardIndex, WildcardMode};
use crate::ordered::OrderedIndex;
use crate::posting::{EntityUid, PostingList};
use crate::registry::IndexType;

/// Concrete backend of an entry. [`IndexType::Exact`] and
/// [`IndexType::Wildcard`] share the wildcard backend in different modes.
#[derive(Debug)]
pub enum Storage {
    Wildcard(WildcardIndex),
    UserKey(OrderedIndex<String, PostingList>),
    Range(RangeIndex),
}

#[derive(Debug)]
pub struct SearchIndexEntry {
    index_type: IndexType,
    key: String,
    storage: Storage,
}

impl SearchIndexEntry {
    pub fn new(
        index_type: IndexType,
        key: impl Into<String>,
        min_length: usize,
        max_length: usize,
    ) -> Result<Self> {
        let key = key.into();
        let storage = match index_type {
            IndexType::Exact | IndexType::Wildcard => {
                Storage::Wildcard(WildcardIndex::new(min_length, max_length)?)
            }
            IndexType::UserKey => Storage::UserKey(OrderedIndex::new()),
            IndexType::Range => Storage::Range(RangeIndex::new(key.clone())),
        };
        Ok(SearchIndexEntry {
            index_type,
            key,
            storage,
        })
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub(crate) fn set_key(&mut self, key: &str) {
        self.key = key.to_string();
        if let Storage::Range(range) = &mut self.storage {
            range.set_name(key);
        }
    }

    pub fn check_type(&self, expected: IndexType) -> Result<()> {
        if self.index_type != expected {
            return Err(QuiverError::type_mismatch(
                &self.key,
                expected,
                self.index_type,
            ));
        }
        Ok(())
    }

    pub fn set_string_thresholds(&mut self, min_length: usize, max_length: usize) -> Result<()> {
        match &mut self.storage {
            Storage::Wildcard(wildcard) => wildcard.set_string_thresholds(min_length, max_length),
            _ => Err(self.unsupported("string thresholds")),
        }
    }

    pub fn put_string(&mut self, value: &str, uid: EntityUid) -> Result<()> {
        let mode = match self.index_type {
            IndexType::Exact => WildcardMode::Exact,
            _ => WildcardMode::Standard,
        };
        match &mut self.storage {
            Storage::Wildcard(wildcard) => wildcard.put(mode, value, uid),
            Storage::UserKey(map) => {
                if map.contains(value) {
                    return Err(QuiverError::duplicate_key(format!(
                        "user key '{value}' in index '{}'",
                        self.key
                    )));
                }
                map.put(value.to_string(), PostingList::with_uid(uid))
            }
            Storage::Range(_) => Err(self.unsupported("string values")),
        }
    }

    pub fn put_integer(&mut self, value: i64, uid: EntityUid) -> Result<()> {
        match &mut self.storage {
            Storage::Range(range) => range.put(value, uid),
            _ => Err(self.unsupported("integer values")),
        }
    }

    pub fn remove_string(&mut self, value: &str, uid: EntityUid) -> Result<()> {
        match &mut self.storage {
            Storage::Wildcard(wildcard) => wildcard.remove(value, uid),
            Storage::UserKey(map) => map.remove(value).map(|_| ()),
            Storage::Range(_) => Err(self.unsupported("string values")),
        }
    }

    pub fn remove_integer(&mut self, value: i64, uid: EntityUid) -> Result<()> {
        match &mut self.storage {
            Storage::Range(range) => range.remove(value, uid),
            _ => Err(self.unsupported("integer values")),
        }
    }

    /// Copy of the posting list stored under `value`.
    pub fn get_string(&self, value: &str) -> Result<Option<PostingList>> {
        match &self.storage {
            Storage::Wildcard(wildcard) => wildcard.get(value),
            Storage::UserKey(map) => Ok(map.get(value).cloned()),
            Storage::Range(_) => Err(self.unsupported("string values")),
        }
    }

    pub fn get_range(&self, search: RangeSearch, min: i64, max: i64) -> Result<Vec<EntityUid>> {
        match &self.storage {
            Storage::Range(range) => range.search(search, min, max),
            _ => Err(self.unsupported("range searches")),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match &self.storage {
            Storage::Wildcard(wildcard) => wildcard.leaf_count(),
            Storage::UserKey(map) => map.leaf_count(),
            Storage::Range(range) => range.leaf_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match &self.storage {
            Storage::Wildcard(wildcard) => wildcard.depth(),
            Storage::UserKey(map) => map.depth(),
            Storage::Range(range) => range.depth(),
        }
    }

    /// Number of distinct values stored.
    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Wildcard(wildcard) => wildcard.len(),
            Storage::UserKey(map) => map.len(),
            Storage::Range(range) => range.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every stored value with its posting list, in key order.
    pub fn for_each_value(&self, mut visit: impl FnMut(String, &PostingList)) {
        match &self.storage {
            Storage::Wildcard(wildcard) => {
                for (value, list) in wildcard.iter() {
                    visit(value.clone(), list);
                }
            }
            Storage::UserKey(map) => {
                for (value, list) in map.iter() {
                    visit(value.clone(), list);
                }
            }
            Storage::Range(range) => {
                for (value, list) in range.iter() {
                    visit(value.to_string(), list);
                }
            }
        }
    }

    fn unsupported(&self, what: &str) -> QuiverError {
        QuiverError::unsupported(format!(
            "{} index '{}' does not support {what}",
            self.index_type, self.key
        ))
    }
}
