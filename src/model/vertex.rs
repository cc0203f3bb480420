//! Vertex and its multi-valued property entries.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Value;

/// Opaque vertex identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub u64);

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque vertex-property identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub u64);

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One concrete value instance of a vertex property.
///
/// Several entries under the same key make the property multi-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyEntry<V = Value> {
    pub id: PropertyId,
    /// Property label as reported by the graph. Usually equal to the map key
    /// the entry is stored under, but graph clients are free to store e.g.
    /// `role` entries under a `roles` key.
    pub key: String,
    pub value: V,
}

impl<V> PropertyEntry<V> {
    pub fn new(id: PropertyId, key: impl Into<String>, value: impl Into<V>) -> Self {
        Self { id, key: key.into(), value: value.into() }
    }
}

/// Ordered entries for one property key. Most properties are single-valued,
/// so one entry is kept inline.
pub type PropertyEntries<V = Value> = SmallVec<[PropertyEntry<V>; 1]>;

/// A labeled vertex carrying a multi-valued property bag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex<V = Value> {
    pub id: VertexId,
    pub label: String,
    pub properties: HashMap<String, PropertyEntries<V>>,
    /// Id handed to the next `with_property` entry. Zero on a vertex that
    /// already has entries means "not yet computed" (e.g. after
    /// deserialization).
    #[serde(skip)]
    next_property_id: u64,
}

impl<V: PartialEq> PartialEq for Vertex<V> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.label == other.label && self.properties == other.properties
    }
}

impl<V> Vertex<V> {
    pub fn new(id: VertexId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            properties: HashMap::new(),
            next_property_id: 0,
        }
    }

    /// Append one entry under `key`. The entry gets an id above every id
    /// already on the vertex, and its key mirrors the map key.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<V>) -> Self {
        self.sync_property_id();
        let id = PropertyId(self.next_property_id);
        self.next_property_id += 1;

        let key = key.into();
        self.properties
            .entry(key.clone())
            .or_default()
            .push(PropertyEntry { id, key, value: value.into() });
        self
    }

    /// Append pre-built entries under `key`, keeping their ids and labels.
    pub fn with_entries(
        mut self,
        key: impl Into<String>,
        entries: impl IntoIterator<Item = PropertyEntry<V>>,
    ) -> Self {
        self.sync_property_id();
        let slot = self.properties.entry(key.into()).or_default();
        for entry in entries {
            self.next_property_id = self.next_property_id.max(entry.id.0 + 1);
            slot.push(entry);
        }
        self
    }

    fn sync_property_id(&mut self) {
        if self.next_property_id == 0 {
            self.next_property_id = self.max_property_id().map_or(0, |id| id + 1);
        }
    }

    fn max_property_id(&self) -> Option<u64> {
        self.properties.values().flatten().map(|e| e.id.0).max()
    }

    /// Register `key` with no entries at all.
    pub fn with_empty(mut self, key: impl Into<String>) -> Self {
        self.properties.entry(key.into()).or_default();
        self
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.label == label
    }

    /// Entries stored under `key`, in insertion order.
    pub fn entries(&self, key: &str) -> Option<&[PropertyEntry<V>]> {
        self.properties.get(key).map(|e| e.as_slice())
    }

    /// First stored value for `key`.
    pub fn value(&self, key: &str) -> Option<&V> {
        self.properties.get(key)?.first().map(|e| &e.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of property keys.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Total number of entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.properties.values().map(|e| e.len()).sum()
    }
}
