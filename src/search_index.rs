//! Catalog of index storage and the read/write surface over it.
//!
//! Locking is two-tier. The catalog lock only protects the key to entry map;
//! each entry carries its own mutex for its storage. Read paths drop the
//! catalog guard before locking an entry, mutation paths keep the catalog read
//! guard for the duration of the entry touch, and catalog changes take the
//! write guard. No path holds two entry locks.

pub mod entry;

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::error::{QuiverError, Result};
use crate::index::RangeSearch;
use crate::intersect::Intersect;
use crate::ordered::OrderedIndex;
use crate::posting::{EntityUid, PostingList};
use crate::registry::{IndexType, RegisteredIndex};
use crate::sync::{CatalogLock, DEFAULT_LOCK_TIMEOUT};

pub use entry::{SearchIndexEntry, Storage};

type SharedEntry = Arc<Mutex<SearchIndexEntry>>;

#[derive(Debug)]
struct Catalog {
    name: String,
    entries: OrderedIndex<String, SharedEntry>,
}

/// Every distinct value of one index with the number of uids under it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexValueSummary {
    pub values: Vec<String>,
    pub counts: Vec<usize>,
}

impl IndexValueSummary {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.values
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }
}

#[derive(Debug)]
pub struct SearchIndex {
    catalog: CatalogLock<Catalog>,
}

impl SearchIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_timeout(name, DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_timeout(name: impl Into<String>, timeout: Duration) -> Self {
        SearchIndex {
            catalog: CatalogLock::with_timeout(
                "search index",
                Catalog {
                    name: name.into(),
                    entries: OrderedIndex::new(),
                },
                timeout,
            ),
        }
    }

    pub fn name(&self) -> Result<String> {
        Ok(self.catalog.read()?.name.clone())
    }

    pub fn rename(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(QuiverError::invalid_argument("empty search index name"));
        }
        let mut catalog = self.catalog.write()?;
        debug!("renamed search index '{}' to '{name}'", catalog.name);
        catalog.name = name.to_string();
        Ok(())
    }

    /// Create storage for a registered index. Wildcard storage uses the
    /// given length window.
    pub fn new_index(
        &self,
        index_type: IndexType,
        key: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<()> {
        check_key(key)?;
        let entry = SearchIndexEntry::new(index_type, key, min_length, max_length)?;

        let mut catalog = self.catalog.write()?;
        if catalog.entries.contains(key) {
            warn!("search index entry '{key}' already exists");
            return Err(QuiverError::duplicate_key(key));
        }
        catalog
            .entries
            .put(key.to_string(), Arc::new(Mutex::new(entry)))?;

        debug!("created {index_type} storage for '{key}'");
        Ok(())
    }

    pub fn remove_index(&self, key: &str) -> Result<()> {
        check_key(key)?;
        let mut catalog = self.catalog.write()?;
        catalog
            .entries
            .remove(key)
            .map_err(|_| QuiverError::not_found(format!("search index entry '{key}'")))?;

        debug!("removed storage for '{key}'");
        Ok(())
    }

    /// Move the storage under `old_key` to `index.key()`. The stored type must
    /// equal `index.index_type()`.
    pub fn rename_index(&self, old_key: &str, index: &RegisteredIndex) -> Result<()> {
        check_key(old_key)?;
        let new_key = index.key();

        let mut catalog = self.catalog.write()?;
        let shared = catalog
            .entries
            .get(old_key)
            .cloned()
            .ok_or_else(|| QuiverError::not_found(format!("search index entry '{old_key}'")))?;
        shared.lock().check_type(index.index_type())?;
        if new_key != old_key && catalog.entries.contains(new_key) {
            return Err(QuiverError::duplicate_key(new_key));
        }

        let moved = catalog.entries.remove(old_key)?;
        moved.lock().set_key(new_key);
        catalog.entries.put(new_key.to_string(), moved)?;

        debug!("moved storage '{old_key}' to '{new_key}'");
        Ok(())
    }

    pub fn set_string_thresholds(
        &self,
        key: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<()> {
        self.mutate(key, |entry| {
            entry.set_string_thresholds(min_length, max_length)
        })
    }

    pub fn put_string(
        &self,
        index_type: IndexType,
        key: &str,
        value: &str,
        uid: EntityUid,
    ) -> Result<()> {
        check_value(value)?;
        self.mutate(key, |entry| {
            entry.check_type(index_type)?;
            entry.put_string(value, uid)
        })
    }

    pub fn put_integer(
        &self,
        index_type: IndexType,
        key: &str,
        value: i64,
        uid: EntityUid,
    ) -> Result<()> {
        self.mutate(key, |entry| {
            entry.check_type(index_type)?;
            entry.put_integer(value, uid)
        })
    }

    pub fn remove_string(
        &self,
        index_type: IndexType,
        key: &str,
        value: &str,
        uid: EntityUid,
    ) -> Result<()> {
        check_value(value)?;
        self.mutate(key, |entry| {
            entry.check_type(index_type)?;
            entry.remove_string(value, uid)
        })
    }

    pub fn remove_integer(
        &self,
        index_type: IndexType,
        key: &str,
        value: i64,
        uid: EntityUid,
    ) -> Result<()> {
        self.mutate(key, |entry| {
            entry.check_type(index_type)?;
            entry.remove_integer(value, uid)
        })
    }

    /// Copy of the uids stored under `value`, `None` when nothing is.
    pub fn get_string(
        &self,
        index_type: IndexType,
        key: &str,
        value: &str,
    ) -> Result<Option<PostingList>> {
        check_value(value)?;
        let shared = self.entry(key)?;
        let entry = shared.lock();
        entry.check_type(index_type)?;
        entry.get_string(value)
    }

    pub fn get_range(
        &self,
        index_type: IndexType,
        key: &str,
        search: RangeSearch,
        min: i64,
        max: i64,
    ) -> Result<Vec<EntityUid>> {
        let shared = self.entry(key)?;
        let entry = shared.lock();
        entry.check_type(index_type)?;
        entry.get_range(search, min, max)
    }

    /// Leaf count of the ordered storage under `key`.
    pub fn get_index_count(&self, index_type: IndexType, key: &str) -> Result<usize> {
        let shared = self.entry(key)?;
        let entry = shared.lock();
        entry.check_type(index_type)?;
        Ok(entry.leaf_count())
    }

    pub fn get_index_depth(&self, index_type: IndexType, key: &str) -> Result<usize> {
        let shared = self.entry(key)?;
        let entry = shared.lock();
        entry.check_type(index_type)?;
        Ok(entry.depth())
    }

    /// Number of distinct uids across every value of the index.
    pub fn get_index_value_count(&self, index_type: IndexType, key: &str) -> Result<usize> {
        let mut intersect = Intersect::new();
        self.build_all_index_value_uids(index_type, key, &mut intersect)?;
        Ok(intersect.len())
    }

    pub fn build_index_value_summary(
        &self,
        index_type: IndexType,
        key: &str,
    ) -> Result<IndexValueSummary> {
        let shared = self.entry(key)?;
        let entry = shared.lock();
        entry.check_type(index_type)?;

        let mut summary = IndexValueSummary {
            values: Vec::with_capacity(entry.len()),
            counts: Vec::with_capacity(entry.len()),
        };
        entry.for_each_value(|value, list| {
            summary.values.push(value);
            summary.counts.push(list.len());
        });
        Ok(summary)
    }

    /// Union every uid of the index into `intersect`, keeping the operands
    /// it already holds.
    pub fn build_all_index_value_uids(
        &self,
        index_type: IndexType,
        key: &str,
        intersect: &mut Intersect,
    ) -> Result<()> {
        let shared = self.entry(key)?;
        {
            let entry = shared.lock();
            entry.check_type(index_type)?;
            entry.for_each_value(|_, list| intersect.put_array(list.as_slice()));
        }
        intersect.exec_or();
        Ok(())
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.catalog.read()?.entries.contains(key))
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

    pub fn is_locked(&self) -> bool {
        self.catalog.is_locked()
    }

    pub fn is_read_locked(&self) -> bool {
        self.catalog.is_read_locked()
    }

    /// Resolve an entry and release the catalog guard.
    fn entry(&self, key: &str) -> Result<SharedEntry> {
        check_key(key)?;
        let catalog = self.catalog.read()?;
        catalog.entries.get(key).cloned().ok_or_else(|| {
            warn!("no search index entry for '{key}'");
            QuiverError::not_found(format!("search index entry '{key}'"))
        })
    }

    /// Run `apply` on an entry while the catalog read guard is held.
    fn mutate<R>(
        &self,
        key: &str,
        apply: impl FnOnce(&mut SearchIndexEntry) -> Result<R>,
    ) -> Result<R> {
        check_key(key)?;
        let catalog = self.catalog.read()?;
        let shared = catalog.entries.get(key).ok_or_else(|| {
            warn!("no search index entry for '{key}'");
            QuiverError::not_found(format!("search index entry '{key}'"))
        })?;
        let mut entry = shared.lock();
        apply(&mut entry)
    }
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(QuiverError::invalid_argument("empty index key"));
    }
    Ok(())
}

fn check_value(value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(QuiverError::invalid_argument("empty index value"));
    }
    Ok(())
}
