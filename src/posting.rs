//! Posting lists: sorted, duplicate-free arrays of entity uids.

use serde::{Deserialize, Serialize};

use crate::error::{QuiverError, Result};

/// Identifier of an indexed entity. Distinct from the per-index `index_uid`
/// assigned by the registry.
pub type EntityUid = u64;

/// Sorted set of entity uids associated with one indexed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingList {
    uids: Vec<EntityUid>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList { uids: Vec::new() }
    }

    pub fn with_uid(uid: EntityUid) -> Self {
        PostingList { uids: vec![uid] }
    }

    /// Build a posting list from arbitrary uids, sorting and deduplicating them.
    pub fn from_unsorted(mut uids: Vec<EntityUid>) -> Self {
        uids.sort_unstable();
        uids.dedup();
        PostingList { uids }
    }

    /// Insert a uid, failing if it is already present.
    pub fn put(&mut self, uid: EntityUid) -> Result<()> {
        match self.uids.binary_search(&uid) {
            Ok(_) => Err(QuiverError::duplicate_key(format!("uid {uid}"))),
            Err(pos) => {
                self.uids.insert(pos, uid);
                Ok(())
            }
        }
    }

    /// Insert a uid unless it is already present. Returns whether it was added.
    pub fn insert(&mut self, uid: EntityUid) -> bool {
        self.put(uid).is_ok()
    }

    /// Remove a uid. Returns whether it was present.
    pub fn remove(&mut self, uid: EntityUid) -> bool {
        match self.uids.binary_search(&uid) {
            Ok(pos) => {
                self.uids.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, uid: EntityUid) -> bool {
        self.uids.binary_search(&uid).is_ok()
    }

    pub fn len(&self) -> usize {
        self.uids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uids.is_empty()
    }

    pub fn as_slice(&self) -> &[EntityUid] {
        &self.uids
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityUid> + '_ {
        self.uids.iter().copied()
    }
}

impl From<PostingList> for Vec<EntityUid> {
    fn from(list: PostingList) -> Self {
        list.uids
    }
}
