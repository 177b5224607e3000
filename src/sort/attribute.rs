//! Attribute value sort keys.
//!
//! Values made only of digits with at most one `.` compare as non-negative
//! decimal numbers, anything else compares as ASCII case-folded text with the
//! shorter of two equal prefixes first. Numbers order before text and a
//! missing value orders after everything.

use std::cmp::Ordering;

use rayon::prelude::*;

use crate::engine::SearchEngine;
use crate::entity::Entity;
use crate::posting::EntityUid;

/// Sorts by the entity uid.
pub const CONTAINER_UID_ATTRIBUTE: &str = "searchd_containerUid";
/// Sorts by the entity name.
pub const CONTAINER_NAME_ATTRIBUTE: &str = "searchd_containerName";
pub const DOMAIN_KEY_ATTRIBUTE: &str = "searchd_domainKey";

#[derive(Debug, Clone)]
pub enum AttributeKey {
    /// Decimal split at the point, leading integer zeros and trailing
    /// fraction zeros removed.
    Numeric { integer: String, fraction: String },
    /// Case-folded text.
    Text(String),
    Missing,
}

impl AttributeKey {
    pub fn from_value(value: &str) -> Self {
        match split_decimal(value) {
            Some((integer, fraction)) => AttributeKey::Numeric {
                integer: integer.to_string(),
                fraction: fraction.to_string(),
            },
            None => AttributeKey::Text(value.to_ascii_lowercase()),
        }
    }

    pub fn from_entity(entity: Option<&dyn Entity>, attribute: &str) -> Self {
        let Some(entity) = entity else {
            return AttributeKey::Missing;
        };
        if attribute == CONTAINER_UID_ATTRIBUTE {
            return AttributeKey::from_value(&entity.uid().to_string());
        }
        if attribute == CONTAINER_NAME_ATTRIBUTE {
            return AttributeKey::from_value(entity.name());
        }
        match entity.get_string(attribute) {
            Some(value) => AttributeKey::from_value(&value),
            None => AttributeKey::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, AttributeKey::Missing)
    }

    /// Bytes this key keeps alive.
    pub fn heap_length(&self) -> usize {
        match self {
            AttributeKey::Numeric { integer, fraction } => integer.len() + fraction.len() + 2,
            AttributeKey::Text(text) => text.len() + 1,
            AttributeKey::Missing => 9,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            AttributeKey::Numeric { .. } => 0,
            AttributeKey::Text(_) => 1,
            AttributeKey::Missing => 2,
        }
    }
}

impl Ord for AttributeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                AttributeKey::Numeric { integer, fraction },
                AttributeKey::Numeric {
                    integer: other_integer,
                    fraction: other_fraction,
                },
            ) => integer
                .len()
                .cmp(&other_integer.len())
                .then_with(|| integer.cmp(other_integer))
                .then_with(|| fraction.cmp(other_fraction)),
            (AttributeKey::Text(text), AttributeKey::Text(other_text)) => text.cmp(other_text),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for AttributeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for AttributeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for AttributeKey {}

/// Compare two raw attribute values.
pub fn compare_attribute_values(a: &str, b: &str) -> Ordering {
    AttributeKey::from_value(a).cmp(&AttributeKey::from_value(b))
}

/// Value made only of digits.
pub fn is_numeric_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Value made of digits with at most one point.
pub fn is_numeric_real(value: &str) -> bool {
    split_decimal(value).is_some()
}

fn split_decimal(value: &str) -> Option<(&str, &str)> {
    let (integer, fraction) = value.split_once('.').unwrap_or((value, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if !digits(integer) || !digits(fraction) {
        return None;
    }
    Some((
        integer.trim_start_matches('0'),
        fraction.trim_end_matches('0'),
    ))
}

/// One key per uid, read in parallel.
pub(crate) fn build_keys(
    engine: &SearchEngine,
    uids: &[EntityUid],
    attribute: &str,
) -> Vec<AttributeKey> {
    uids.par_iter()
        .map(|uid| {
            let entity = engine.entity(*uid);
            AttributeKey::from_entity(entity.as_deref(), attribute)
        })
        .collect()
}
