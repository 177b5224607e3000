//! Read access to the entities a result set refers to.
//!
//! Sorting and faceting read attribute values through the [`Entity`] and
//! [`EntityStore`] traits so the engine does not depend on how entities are
//! stored. [`MemoryEntityStore`] is the in-process implementation the binary
//! and the tests use.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{QuiverError, Result};
use crate::posting::EntityUid;

/// Typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Double(f64),
    Boolean(bool),
    Text(String),
}

impl AttributeValue {
    /// String rendering used by string indexes, attribute sorts and facets.
    pub fn to_text(&self) -> String {
        match self {
            AttributeValue::Text(text) => text.clone(),
            AttributeValue::Integer(value) => value.to_string(),
            AttributeValue::Double(value) => value.to_string(),
            AttributeValue::Boolean(value) => value.to_string(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(value) => Some(*value),
            AttributeValue::Double(value) if value.fract() == 0.0 => Some(*value as i64),
            AttributeValue::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            AttributeValue::Double(value) => Some(*value),
            AttributeValue::Integer(value) => Some(*value as f64),
            AttributeValue::Text(text) => text.trim().parse().ok(),
            AttributeValue::Boolean(_) => None,
        }
    }
}

/// One stored entity.
pub trait Entity: Send + Sync {
    fn uid(&self) -> EntityUid;

    fn name(&self) -> &str;

    fn exists(&self, attribute: &str) -> bool;

    fn get_string(&self, attribute: &str) -> Option<String>;

    fn get_integer(&self, attribute: &str) -> Option<i64>;

    fn get_double(&self, attribute: &str) -> Option<f64>;
}

/// Lookup of entities by uid. The returned handle stays valid after the store
/// changes.
pub trait EntityStore: Send + Sync {
    fn get(&self, uid: EntityUid) -> Option<Arc<dyn Entity>>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MemoryEntity {
    uid: EntityUid,
    name: String,
    attributes: AHashMap<String, AttributeValue>,
}

impl MemoryEntity {
    pub fn new(uid: EntityUid, name: impl Into<String>) -> Self {
        MemoryEntity {
            uid,
            name: name.into(),
            attributes: AHashMap::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>, value: AttributeValue) -> Self {
        self.set(attribute, value);
        self
    }

    pub fn with_text(self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attribute(attribute, AttributeValue::Text(value.into()))
    }

    pub fn set(&mut self, attribute: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(attribute.into(), value);
    }

    pub fn attribute(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    /// Attribute names and values in name order.
    pub fn attributes(&self) -> Vec<(&str, &AttributeValue)> {
        let mut attributes: Vec<_> = self
            .attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value))
            .collect();
        attributes.sort_by(|a, b| a.0.cmp(b.0));
        attributes
    }

    /// Build an entity from a JSON object with a numeric `uid`, an optional
    /// `name` and scalar attributes.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| QuiverError::invalid_argument("entity must be a JSON object"))?;
        let uid = object
            .get("uid")
            .and_then(Value::as_u64)
            .ok_or_else(|| QuiverError::invalid_argument("entity needs a numeric 'uid'"))?;
        let name = object.get("name").and_then(Value::as_str).unwrap_or_default();

        let mut entity = MemoryEntity::new(uid, name);
        for (attribute, value) in object {
            if attribute == "uid" || attribute == "name" || value.is_null() {
                continue;
            }
            let value: AttributeValue = serde_json::from_value(value.clone()).map_err(|_| {
                QuiverError::invalid_argument(format!(
                    "attribute '{attribute}' of entity {uid} is not a scalar"
                ))
            })?;
            entity.set(attribute.as_str(), value);
        }
        Ok(entity)
    }
}

impl Entity for MemoryEntity {
    fn uid(&self) -> EntityUid {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn exists(&self, attribute: &str) -> bool {
        self.attributes.contains_key(attribute)
    }

    fn get_string(&self, attribute: &str) -> Option<String> {
        self.attributes.get(attribute).map(AttributeValue::to_text)
    }

    fn get_integer(&self, attribute: &str) -> Option<i64> {
        self.attributes.get(attribute).and_then(AttributeValue::as_integer)
    }

    fn get_double(&self, attribute: &str) -> Option<f64> {
        self.attributes.get(attribute).and_then(AttributeValue::as_double)
    }
}

#[derive(Debug, Default)]
pub struct MemoryEntityStore {
    entities: RwLock<AHashMap<EntityUid, Arc<MemoryEntity>>>,
}

impl MemoryEntityStore {
    pub fn new() -> Self {
        MemoryEntityStore::default()
    }

    /// Store an entity, returning the one it replaced.
    pub fn insert(&self, entity: MemoryEntity) -> Option<Arc<MemoryEntity>> {
        self.entities.write().insert(entity.uid, Arc::new(entity))
    }

    pub fn remove(&self, uid: EntityUid) -> Option<Arc<MemoryEntity>> {
        self.entities.write().remove(&uid)
    }

    pub fn entity(&self, uid: EntityUid) -> Option<Arc<MemoryEntity>> {
        self.entities.read().get(&uid).cloned()
    }

    /// Every uid in ascending order.
    pub fn uids(&self) -> Vec<EntityUid> {
        let mut uids: Vec<_> = self.entities.read().keys().copied().collect();
        uids.sort_unstable();
        uids
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }
}

impl EntityStore for MemoryEntityStore {
    fn get(&self, uid: EntityUid) -> Option<Arc<dyn Entity>> {
        self.entity(uid).map(|entity| entity as Arc<dyn Entity>)
    }
}
