//! Integer storage for interval searches.
//!
//! Each distinct value owns a bucket of uids. Searches concatenate every
//! matching bucket and sort the result, so a uid indexed under several values
//! in the interval appears once per value.

use std::fmt;

use crate::error::{QuiverError, Result};
use crate::ordered::OrderedIndex;
use crate::posting::{EntityUid, PostingList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeSearch {
    /// Bucket equal to `min`.
    Exact,
    /// Buckets strictly greater than `min`.
    GreaterThan,
    /// Buckets strictly less than `min`.
    LessThan,
    /// Buckets in `[min, max]`.
    Between,
}

impl fmt::Display for RangeSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RangeSearch::Exact => "Exact",
            RangeSearch::GreaterThan => "Greater Than",
            RangeSearch::LessThan => "Less Than",
            RangeSearch::Between => "Between",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct RangeIndex {
    name: String,
    index: OrderedIndex<i64, PostingList>,
}

impl RangeIndex {
    pub fn new(name: impl Into<String>) -> Self {
        RangeIndex {
            name: name.into(),
            index: OrderedIndex::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Copy of the bucket for `value`.
    pub fn get(&self, value: i64) -> Option<PostingList> {
        self.index.get(&value).cloned()
    }

    pub fn put(&mut self, value: i64, uid: EntityUid) -> Result<()> {
        match self.index.get_mut(&value) {
            Some(list) => list.put(uid),
            None => self.index.put(value, PostingList::with_uid(uid)),
        }
    }

    /// Remove `uid` from the bucket for `value`; an emptied bucket is dropped.
    pub fn remove(&mut self, value: i64, uid: EntityUid) -> Result<()> {
        let list = self
            .index
            .get_mut(&value)
            .ok_or_else(|| QuiverError::not_found(format!("range bucket {value}")))?;

        if !list.remove(uid) {
            return Err(QuiverError::not_found(format!(
                "uid {uid} in range bucket {value}"
            )));
        }
        if list.is_empty() {
            self.index.remove(&value)?;
        }
        Ok(())
    }

    /// Uids whose value satisfies `search`. `max` is only read for
    /// [`RangeSearch::Between`].
    pub fn search(&self, search: RangeSearch, min: i64, max: i64) -> Result<Vec<EntityUid>> {
        let mut result: Vec<EntityUid> = Vec::new();
        let mut collect = |list: &PostingList| result.extend(list.iter());

        match search {
            RangeSearch::Exact => {
                if let Some(list) = self.index.get(&min) {
                    collect(list);
                }
            }
            RangeSearch::GreaterThan => {
                let mut cursor = min;
                while let Some((&value, list)) = self.index.next_after(&cursor) {
                    collect(list);
                    cursor = value;
                }
            }
            RangeSearch::LessThan => {
                let mut cursor = min;
                while let Some((&value, list)) = self.index.previous_before(&cursor) {
                    collect(list);
                    cursor = value;
                }
            }
            RangeSearch::Between => {
                if min > max {
                    return Err(QuiverError::invalid_argument(format!(
                        "range search minimum {min} exceeds maximum {max}"
                    )));
                }
                for (_, list) in self.index.range_inclusive(&min, &max) {
                    collect(list);
                }
            }
        }

        result.sort_unstable();
        Ok(result)
    }

    /// Number of distinct values indexed.
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

    pub fn iter(&self) -> impl Iterator<Item = (&i64, &PostingList)> {
        self.index.iter()
    }
}
