//! String storage with optional prefix/suffix expansion.
//!
//! Every value is first reduced to the wildcard alphabet: ASCII letters
//! lowercased, digits kept, control characters and spaces turned into a space,
//! anything else dropped, and the result cut at the maximum length. In
//! [`WildcardMode::Standard`] a value is posted under the full string and under
//! each of its suffixes and prefixes that are at least the minimum length, so a
//! lookup of any such fragment finds it.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{QuiverError, Result};
use crate::ordered::OrderedIndex;
use crate::posting::{EntityUid, PostingList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardMode {
    /// Post the full string and its prefix/suffix permutations.
    Standard,
    /// Post the full string only.
    Exact,
}

#[derive(Debug)]
pub struct WildcardIndex {
    min_length: usize,
    max_length: usize,
    ticks: AtomicU64,
    index: OrderedIndex<String, PostingList>,
}

impl WildcardIndex {
    pub fn new(min_length: usize, max_length: usize) -> Result<Self> {
        check_thresholds(min_length, max_length)?;
        Ok(WildcardIndex {
            min_length,
            max_length,
            ticks: AtomicU64::new(0),
            index: OrderedIndex::new(),
        })
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Number of get/put/remove calls served.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Change the length window applied to later operations.
    pub fn set_string_thresholds(&mut self, min_length: usize, max_length: usize) -> Result<()> {
        check_thresholds(min_length, max_length)?;
        self.min_length = min_length;
        self.max_length = max_length;
        Ok(())
    }

    /// Copy of the posting list stored under `value`.
    pub fn get(&self, value: &str) -> Result<Option<PostingList>> {
        self.tick();
        let key = self.workspace(value)?;
        Ok(self.index.get(key.as_str()).cloned())
    }

    pub fn put(&mut self, mode: WildcardMode, value: &str, uid: EntityUid) -> Result<()> {
        self.tick();
        let key = self.workspace(value)?;

        match self.index.get_mut(key.as_str()) {
            Some(list) => list.put(uid)?,
            None => self.index.put(key.clone(), PostingList::with_uid(uid))?,
        }

        if mode == WildcardMode::Standard {
            for fragment in Self::fragments(&key, self.min_length) {
                match self.index.get_mut(fragment) {
                    Some(list) => {
                        list.insert(uid);
                    }
                    None => self
                        .index
                        .put(fragment.to_string(), PostingList::with_uid(uid))?,
                }
            }
        }
        Ok(())
    }

    /// Remove `uid` from the full string and every permutation of it,
    /// dropping lists that become empty.
    pub fn remove(&mut self, value: &str, uid: EntityUid) -> Result<()> {
        self.tick();
        let key = self.workspace(value)?;

        let posted = self
            .index
            .get(key.as_str())
            .is_some_and(|list| list.contains(uid));
        if !posted {
            return Err(QuiverError::not_found(format!(
                "uid {uid} under wildcard value '{key}'"
            )));
        }

        self.remove_from(&key, uid);
        for fragment in Self::fragments(&key, self.min_length) {
            self.remove_from(fragment, uid);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.index.leaf_count()
    }

    pub fn depth(&self) -> usize {
        self.index.depth()
    }

    /// Every stored string with its posting list, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PostingList)> {
        self.index.iter()
    }

    fn tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    fn remove_from(&mut self, key: &str, uid: EntityUid) {
        let emptied = match self.index.get_mut(key) {
            Some(list) => list.remove(uid) && list.is_empty(),
            None => false,
        };
        if emptied {
            let _ = self.index.remove(key);
        }
    }

    /// Suffixes (dropping 1.. leading chars) then prefixes (dropping 1..
    /// trailing chars), each at least `min_length` long.
    fn fragments(key: &str, min: usize) -> impl Iterator<Item = &str> {
        let length = key.len();
        let suffixes = (1..length)
            .take_while(move |start| length - start >= min)
            .map(move |start| &key[start..]);
        let prefixes = (min.max(1)..length).rev().map(move |end| &key[..end]);
        suffixes.chain(prefixes)
    }

    fn workspace(&self, value: &str) -> Result<String> {
        let result: String = value
            .chars()
            .filter_map(wildcard_char)
            .take(self.max_length)
            .collect();

        if result.len() < self.min_length || result.is_empty() {
            return Err(QuiverError::invalid_argument(format!(
                "wildcard value '{value}' is shorter than {} characters",
                self.min_length
            )));
        }
        Ok(result)
    }
}

/// Length of `value` once reduced to the wildcard alphabet, before the
/// maximum length cut.
pub fn wildcard_length(value: &str) -> usize {
    value.chars().filter_map(wildcard_char).count()
}

fn wildcard_char(c: char) -> Option<char> {
    if !c.is_ascii() || c.is_ascii_control() || c == ' ' {
        Some(' ')
    } else if c.is_ascii_alphanumeric() {
        Some(c.to_ascii_lowercase())
    } else {
        None
    }
}

fn check_thresholds(min_length: usize, max_length: usize) -> Result<()> {
    if min_length > max_length {
        return Err(QuiverError::invalid_argument(format!(
            "wildcard minimum length {min_length} exceeds maximum {max_length}"
        )));
    }
    Ok(())
}
