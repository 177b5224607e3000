//! Composite sorts over several criteria.
//!
//! A [`MultiSort`] copies the uids of a result set, precomputes one key per
//! uid for every criterion as it is added, and orders the uids in a single
//! pass that compares criteria in the order they were added.

use std::cmp::Ordering;
use std::mem::size_of;

use log::warn;

use crate::engine::SearchEngine;
use crate::error::{QuiverError, Result};
use crate::intersect::Intersect;
use crate::posting::EntityUid;
use crate::sort::SortOrder;
use crate::sort::attribute::{self, AttributeKey};
use crate::sort::distance::{self, validate_coordinates};
use crate::sort::relevancy;

#[derive(Debug, Clone, PartialEq)]
pub enum SortKind {
    Attribute { attribute: String },
    Relevancy { attribute: String, query: String },
    Distance { latitude: f64, longitude: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortCriterion {
    pub kind: SortKind,
    pub order: SortOrder,
}

#[derive(Debug, Clone)]
pub enum SortKey {
    Attribute(AttributeKey),
    Relevancy(f64),
    Distance(f64),
}

impl SortKey {
    fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Attribute(a), SortKey::Attribute(b)) => a.cmp(b),
            (SortKey::Relevancy(a), SortKey::Relevancy(b)) => a.total_cmp(b),
            (SortKey::Distance(a), SortKey::Distance(b)) => a.total_cmp(b),
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone)]
struct SortEntry {
    uid: EntityUid,
    items: Vec<SortKey>,
}

#[derive(Debug)]
pub struct MultiSort<'a> {
    engine: &'a SearchEngine,
    criteria: Vec<SortCriterion>,
    entries: Vec<SortEntry>,
    memory_length: u64,
}

impl<'a> MultiSort<'a> {
    pub fn new(engine: &'a SearchEngine, uids: &[EntityUid]) -> Self {
        MultiSort {
            engine,
            criteria: Vec::new(),
            entries: uids
                .iter()
                .map(|uid| SortEntry {
                    uid: *uid,
                    items: Vec::new(),
                })
                .collect(),
            memory_length: Self::init_memory_length(uids.len()),
        }
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated bytes held by the entries and every key added so far.
    pub fn memory_length(&self) -> u64 {
        self.memory_length
    }

    pub fn add_sort_by_attribute_name(&mut self, attribute: &str, order: SortOrder) -> Result<()> {
        let keys = attribute::build_keys(self.engine, &self.uids(), attribute);
        self.push_attribute(attribute, order, keys);
        Ok(())
    }

    pub fn add_sort_by_relevancy(
        &mut self,
        attribute: &str,
        query: &str,
        order: SortOrder,
    ) -> Result<()> {
        let (index, tokens) = relevancy::prepare_query(self.engine, attribute, query)?;
        let scores = relevancy::build_scores(self.engine, &self.uids(), index.key(), &tokens);
        let estimate = self.relevancy_memory_length();
        self.push(
            SortKind::Relevancy {
                attribute: attribute.to_string(),
                query: query.to_string(),
            },
            order,
            scores.into_iter().map(SortKey::Relevancy),
            estimate,
        );
        Ok(())
    }

    pub fn add_sort_by_distance(
        &mut self,
        latitude: f64,
        longitude: f64,
        order: SortOrder,
    ) -> Result<()> {
        validate_coordinates(latitude, longitude)?;
        let distances = distance::build_distances(self.engine, &self.uids(), latitude, longitude);
        let estimate = self.distance_memory_length();
        self.push(
            SortKind::Distance {
                latitude,
                longitude,
            },
            order,
            distances.into_iter().map(SortKey::Distance),
            estimate,
        );
        Ok(())
    }

    /// Like [`Self::add_sort_by_attribute_name`], refusing criteria that push
    /// the estimate past the engine's sort memory budget.
    pub fn add_sort_by_attribute_name_checked(
        &mut self,
        attribute: &str,
        order: SortOrder,
    ) -> Result<()> {
        let limit = self.engine.max_sort_operation_memory_length();
        // Fail before reading any entity when the keyless part is over budget.
        self.check_budget(self.scalar_memory_length(), limit)?;

        let keys = attribute::build_keys(self.engine, &self.uids(), attribute);
        self.check_budget(Self::attribute_memory_length(&keys), limit)?;
        self.push_attribute(attribute, order, keys);
        Ok(())
    }

    pub fn add_sort_by_relevancy_checked(
        &mut self,
        attribute: &str,
        query: &str,
        order: SortOrder,
    ) -> Result<()> {
        let limit = self.engine.max_sort_operation_memory_length();
        self.check_budget(self.relevancy_memory_length(), limit)?;
        self.add_sort_by_relevancy(attribute, query, order)
    }

    pub fn add_sort_by_distance_checked(
        &mut self,
        latitude: f64,
        longitude: f64,
        order: SortOrder,
    ) -> Result<()> {
        let limit = self.engine.max_sort_operation_memory_length();
        self.check_budget(self.distance_memory_length(), limit)?;
        self.add_sort_by_distance(latitude, longitude, order)
    }

    /// Order the uids by every criterion and write them into `intersect`.
    pub fn execute(mut self, intersect: &mut Intersect) {
        let criteria = &self.criteria;
        self.entries.sort_by(|a, b| {
            for (id, criterion) in criteria.iter().enumerate() {
                let ordering = criterion.order.apply(a.items[id].compare(&b.items[id]));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
        intersect.set_result(self.entries.into_iter().map(|entry| entry.uid).collect());
    }

    /// Bytes for `length` entries without keys.
    pub fn init_memory_length(length: usize) -> u64 {
        (length * size_of::<SortEntry>()) as u64
    }

    /// Bytes an attribute criterion with `keys` adds.
    pub fn attribute_memory_length(keys: &[AttributeKey]) -> u64 {
        let length = keys.len();
        let fixed = size_of::<SortCriterion>()
            + length * size_of::<usize>()
            + length * size_of::<SortKey>();
        let values: usize = keys.iter().map(AttributeKey::heap_length).sum();
        (fixed + values) as u64
    }

    fn push_attribute(&mut self, attribute: &str, order: SortOrder, keys: Vec<AttributeKey>) {
        let estimate = Self::attribute_memory_length(&keys);
        self.push(
            SortKind::Attribute {
                attribute: attribute.to_string(),
            },
            order,
            keys.into_iter().map(SortKey::Attribute),
            estimate,
        );
    }

    pub fn relevancy_memory_length(&self) -> u64 {
        self.scalar_memory_length()
    }

    pub fn distance_memory_length(&self) -> u64 {
        self.scalar_memory_length()
    }

    fn scalar_memory_length(&self) -> u64 {
        let length = self.entries.len();
        (size_of::<SortCriterion>() + length * size_of::<usize>() + length * size_of::<SortKey>())
            as u64
    }

    fn check_budget(&self, estimate: u64, limit: u64) -> Result<()> {
        let total = self.memory_length.saturating_add(estimate);
        if total > limit {
            warn!("composite sort needs {total} bytes, the limit is {limit}");
            return Err(QuiverError::unsupported(format!(
                "composite sort needs {total} bytes, the limit is {limit}"
            )));
        }
        Ok(())
    }

    fn uids(&self) -> Vec<EntityUid> {
        self.entries.iter().map(|entry| entry.uid).collect()
    }

    fn push(
        &mut self,
        kind: SortKind,
        order: SortOrder,
        keys: impl Iterator<Item = SortKey>,
        estimate: u64,
    ) {
        for (entry, key) in self.entries.iter_mut().zip(keys) {
            entry.items.push(key);
        }
        self.criteria.push(SortCriterion { kind, order });
        self.memory_length = self.memory_length.saturating_add(estimate);
    }
}
