//! Facet histograms over a result set.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::{contains_alphabetic, contains_vowel, normalize_string, tokenize};
use crate::engine::SearchEngine;
use crate::error::Result;
use crate::posting::EntityUid;
use crate::registry::{IndexType, ResolvedSettings};
use crate::sort::attribute::{
    CONTAINER_NAME_ATTRIBUTE, CONTAINER_UID_ATTRIBUTE, DOMAIN_KEY_ATTRIBUTE,
};

/// Attributes that never produce facets.
pub const RESERVED_FACET_ATTRIBUTES: &[&str] = &[
    DOMAIN_KEY_ATTRIBUTE,
    CONTAINER_UID_ATTRIBUTE,
    CONTAINER_NAME_ATTRIBUTE,
    "uid",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetEntry {
    pub value: String,
    pub count: usize,
}

pub fn is_reserved_facet_attribute(attribute: &str) -> bool {
    RESERVED_FACET_ATTRIBUTES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(attribute))
}

/// Count the normalized values, and the tokens of the values, of `attribute`
/// over `uids`. Buckets come back in value order.
pub fn calculate_facets(
    engine: &SearchEngine,
    uids: &[EntityUid],
    attribute: &str,
) -> Result<Vec<FacetEntry>> {
    if attribute.is_empty() || is_reserved_facet_attribute(attribute) {
        return Ok(Vec::new());
    }

    let index = engine.get_index(attribute)?;
    let counter = FacetCounter {
        engine,
        index_type: index.index_type(),
        settings: engine.resolve_settings(&index),
    };

    let mut buckets: BTreeMap<String, usize> = BTreeMap::new();
    for uid in uids {
        let Some(value) = engine
            .entity(*uid)
            .and_then(|entity| entity.get_string(attribute))
        else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        counter.count_value(&value, &mut buckets);
    }

    Ok(buckets
        .into_iter()
        .map(|(value, count)| FacetEntry { value, count })
        .collect())
}

struct FacetCounter<'a> {
    engine: &'a SearchEngine,
    index_type: IndexType,
    settings: ResolvedSettings,
}

impl FacetCounter<'_> {
    fn count_value(&self, value: &str, buckets: &mut BTreeMap<String, usize>) {
        let indexing = self.settings.string_indexing;

        if indexing.full_string {
            self.count_term(value, buckets);
        }

        if indexing.tokenized {
            let tokens = tokenize(
                value,
                &self.settings.delimiters,
                self.settings.min_string_length,
            );
            if indexing.full_string && tokens.len() == 1 && tokens[0] == value {
                return;
            }
            for token in &tokens {
                self.count_term(token, buckets);
            }
        }
    }

    fn count_term(&self, term: &str, buckets: &mut BTreeMap<String, usize>) {
        if !self.within_thresholds(term) {
            return;
        }
        let normalized = normalize_string(term);
        if normalized.chars().count() < self.settings.min_string_length {
            return;
        }
        if self.is_excluded(&normalized) {
            return;
        }
        *buckets.entry(normalized).or_insert(0) += 1;
    }

    fn within_thresholds(&self, term: &str) -> bool {
        let length = term.chars().count();
        length >= self.settings.min_string_length && length <= self.settings.max_string_length
    }

    fn is_excluded(&self, normalized: &str) -> bool {
        if !contains_vowel(normalized) && !contains_alphabetic(normalized) {
            return false;
        }
        let excluded = &self.settings.excluded_words;
        if excluded.contains(normalized) {
            return true;
        }
        if self.index_type != IndexType::Wildcard {
            return false;
        }
        self.engine
            .stemmer()
            .stem_token(normalized)
            .is_some_and(|stem| self.within_thresholds(&stem) && excluded.contains(&stem))
    }
}
