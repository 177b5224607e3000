//! Ordered key/value store shared by the catalogs and the value maps.
//!
//! Removal hands ownership of the value back to the caller, so moving a value
//! under a new key is `remove` followed by `put` with nothing freed in between.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::Bound;

use crate::error::{QuiverError, Result};

/// Fan-out used when reporting the shape of the store as a B+Tree.
pub const TREE_ORDER: usize = 16;

#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    map: BTreeMap<K, V>,
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        OrderedIndex {
            map: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Debug, V> OrderedIndex<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new key. An existing key is left untouched and reported.
    pub fn put(&mut self, key: K, value: V) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(QuiverError::duplicate_key(format!("{key:?}")));
        }
        self.map.insert(key, value);
        Ok(())
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.get(key)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.get_mut(key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map.contains_key(key)
    }

    /// Remove a key and return its value to the caller.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + Debug + ?Sized,
    {
        self.map
            .remove(key)
            .ok_or_else(|| QuiverError::not_found(format!("{key:?}")))
    }

    /// Entry with the smallest key strictly greater than `key`.
    pub fn next_after<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map
            .range::<Q, _>((Bound::Excluded(key), Bound::Unbounded))
            .next()
    }

    /// Entry with the largest key strictly less than `key`.
    pub fn previous_before<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map
            .range::<Q, _>((Bound::Unbounded, Bound::Excluded(key)))
            .next_back()
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.map.iter().next()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> {
        self.map.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.map.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.map.values()
    }

    /// Entries with keys in `[low, high]`.
    pub fn range_inclusive<Q>(&self, low: &Q, high: &Q) -> impl Iterator<Item = (&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.map
            .range::<Q, _>((Bound::Included(low), Bound::Included(high)))
    }

    /// Export keys and values in key order.
    pub fn to_array(&self) -> (Vec<K>, Vec<V>)
    where
        K: Clone,
        V: Clone,
    {
        self.map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .unzip()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of leaves a B+Tree of [`TREE_ORDER`] would need for these keys.
    pub fn leaf_count(&self) -> usize {
        self.map.len().div_ceil(TREE_ORDER)
    }

    /// Depth of a B+Tree of [`TREE_ORDER`] holding these keys.
    pub fn depth(&self) -> usize {
        let mut nodes = self.leaf_count();
        if nodes == 0 {
            return 0;
        }

        let mut depth = 1;
        while nodes > 1 {
            nodes = nodes.div_ceil(TREE_ORDER);
            depth += 1;
        }
        depth
    }
}

impl<K: Ord + Debug, V> FromIterator<(K, V)> for OrderedIndex<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        OrderedIndex {
            map: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let mut index: OrderedIndex<String, u32> = OrderedIndex::new();
        index.put("beta".to_string(), 2).unwrap();
        index.put("alpha".to_string(), 1).unwrap();

        assert!(matches!(
            index.put("alpha".to_string(), 9),
            Err(QuiverError::DuplicateKey(_))
        ));
        assert_eq!(index.get("alpha"), Some(&1));

        assert_eq!(index.remove("alpha").unwrap(), 1);
        assert!(matches!(index.remove("alpha"), Err(QuiverError::NotFound(_))));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_ordered_navigation() {
        let index: OrderedIndex<i64, &str> =
            [(10, "ten"), (-4, "minus four"), (3, "three")].into_iter().collect();

        assert_eq!(index.first(), Some((&-4, &"minus four")));
        assert_eq!(index.next_after(&-4), Some((&3, &"three")));
        assert_eq!(index.next_after(&5), Some((&10, &"ten")));
        assert_eq!(index.next_after(&10), None);
        assert_eq!(index.previous_before(&3), Some((&-4, &"minus four")));

        let (keys, values) = index.to_array();
        assert_eq!(keys, vec![-4, 3, 10]);
        assert_eq!(values, vec!["minus four", "three", "ten"]);
    }

    #[test]
    fn test_tree_shape() {
        let mut index: OrderedIndex<usize, ()> = OrderedIndex::new();
        assert_eq!(index.leaf_count(), 0);
        assert_eq!(index.depth(), 0);

        index.put(1, ()).unwrap();
        assert_eq!(index.leaf_count(), 1);
        assert_eq!(index.depth(), 1);

        for key in 2..=(TREE_ORDER * TREE_ORDER + 1) {
            index.put(key, ()).unwrap();
        }
        assert_eq!(index.leaf_count(), TREE_ORDER + 1);
        assert_eq!(index.depth(), 3);
    }
}
