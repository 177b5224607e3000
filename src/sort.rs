//! Ordering and faceting of result sets.
//!
//! A [`SearchSort`] works on the uid list of an [`Intersect`]. Single
//! criterion sorts build one key per uid, order the uids by it and write them
//! back in place. [`MultiSort`] does the same for several criteria at once, and
//! [`SearchSort::calculate_facets`] counts attribute values over the list.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use quiver::config::EngineSettings;
//! use quiver::engine::SearchEngine;
//! use quiver::entity::{MemoryEntity, MemoryEntityStore};
//! use quiver::intersect::Intersect;
//! use quiver::sort::SortOrder;
//!
//! let store = MemoryEntityStore::new();
//! store.insert(MemoryEntity::new(1, "a").with_text("score", "30"));
//! store.insert(MemoryEntity::new(2, "b").with_text("score", "5"));
//! store.insert(MemoryEntity::new(3, "c").with_text("score", "100"));
//! let engine = SearchEngine::new(EngineSettings::default(), Arc::new(store)).unwrap();
//!
//! let mut intersect = Intersect::from_result(vec![1, 2, 3]);
//! engine
//!     .search_sort(&mut intersect)
//!     .sort_by_attribute_name("score", SortOrder::Ascending)
//!     .unwrap();
//! assert_eq!(intersect.result(), &[2, 1, 3]);
//! ```

pub mod attribute;
pub mod distance;
pub mod facet;
pub mod multi;
pub mod relevancy;

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::engine::SearchEngine;
use crate::error::{QuiverError, Result};
use crate::intersect::Intersect;
use crate::posting::EntityUid;

pub use attribute::{AttributeKey, compare_attribute_values};
pub use distance::calculate_geo_coord_distance_miles;
pub use facet::{FacetEntry, calculate_facets};
pub use multi::{MultiSort, SortCriterion, SortKey, SortKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Orient an ascending comparison.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Ascending => f.write_str("asc"),
            SortOrder::Descending => f.write_str("desc"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = QuiverError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(QuiverError::invalid_argument(format!(
                "unknown sort order '{s}'"
            ))),
        }
    }
}

pub struct SearchSort<'a> {
    engine: &'a SearchEngine,
    intersect: &'a mut Intersect,
}

impl<'a> SearchSort<'a> {
    pub fn new(engine: &'a SearchEngine, intersect: &'a mut Intersect) -> Self {
        SearchSort { engine, intersect }
    }

    pub fn uids(&self) -> &[EntityUid] {
        self.intersect.result()
    }

    pub fn sort_by_attribute_name(&mut self, attribute: &str, order: SortOrder) -> Result<()> {
        if attribute.is_empty() {
            return Err(QuiverError::invalid_argument("empty sort attribute"));
        }
        let keys = attribute::build_keys(self.engine, self.uids(), attribute);
        self.reorder(&keys, order, |a, b| a.cmp(b));
        Ok(())
    }

    pub fn sort_by_relevancy(
        &mut self,
        attribute: &str,
        query: &str,
        order: SortOrder,
    ) -> Result<()> {
        let (index, tokens) = relevancy::prepare_query(self.engine, attribute, query)?;
        let scores = relevancy::build_scores(self.engine, self.uids(), index.key(), &tokens);
        self.reorder(&scores, order, f64::total_cmp);
        Ok(())
    }

    pub fn sort_by_distance(
        &mut self,
        latitude: f64,
        longitude: f64,
        order: SortOrder,
    ) -> Result<()> {
        distance::validate_coordinates(latitude, longitude)?;
        let distances = distance::build_distances(self.engine, self.uids(), latitude, longitude);
        self.reorder(&distances, order, f64::total_cmp);
        Ok(())
    }

    pub fn calculate_facets(&self, attribute: &str) -> Result<Vec<FacetEntry>> {
        facet::calculate_facets(self.engine, self.uids(), attribute)
    }

    /// Start a composite sort over a copy of the current uids.
    pub fn multi_sort(&self) -> MultiSort<'a> {
        MultiSort::new(self.engine, self.uids())
    }

    /// Run a composite sort and store its order.
    pub fn execute(&mut self, sort: MultiSort<'_>) {
        sort.execute(self.intersect);
    }

    fn reorder<K>(&mut self, keys: &[K], order: SortOrder, compare: impl Fn(&K, &K) -> Ordering) {
        let mut positions: Vec<usize> = (0..keys.len()).collect();
        positions.sort_by(|a, b| order.apply(compare(&keys[*a], &keys[*b])));

        let original = self.intersect.result().to_vec();
        for (slot, position) in self.intersect.result_mut().iter_mut().zip(positions) {
            *slot = original[position];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_order() {
        assert_eq!(SortOrder::Ascending.apply(Ordering::Less), Ordering::Less);
        assert_eq!(SortOrder::Descending.apply(Ordering::Less), Ordering::Greater);
        assert_eq!("DESC".parse::<SortOrder>().unwrap(), SortOrder::Descending);
        assert!("up".parse::<SortOrder>().is_err());
        assert_eq!(SortOrder::default().to_string(), "asc");
    }
}
