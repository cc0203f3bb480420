//! Flattened output: one resolved value per property key.

use std::hash::Hash;

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use super::{Cardinality, FromValue, Value};
use crate::{Error, Result};

/// A property key's entries after cardinality resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cardinality", content = "value", rename_all = "lowercase")]
pub enum Resolved<V: Eq + Hash = Value> {
    /// `single` key: the first stored value.
    Single(V),
    /// `single` key that had no entries.
    Absent,
    /// `list` key: all values in stored order.
    List(Vec<V>),
    /// `set` key: distinct values.
    Set(HashSet<V>),
}

impl<V: Eq + Hash> Resolved<V> {
    /// The cardinality that produced this value.
    pub fn cardinality(&self) -> Cardinality {
        match self {
            Resolved::Single(_) | Resolved::Absent => Cardinality::Single,
            Resolved::List(_) => Cardinality::List,
            Resolved::Set(_) => Cardinality::Set,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn as_single(&self) -> Option<&V> {
        match self {
            Resolved::Single(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[V]> {
        match self {
            Resolved::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&HashSet<V>> {
        match self {
            Resolved::Set(s) => Some(s),
            _ => None,
        }
    }

    /// Number of values held: 0 or 1 for `single`, element count otherwise.
    pub fn len(&self) -> usize {
        match self {
            Resolved::Single(_) => 1,
            Resolved::Absent => 0,
            Resolved::List(l) => l.len(),
            Resolved::Set(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shape_name(&self) -> &'static str {
        match self {
            Resolved::Single(_) => "single",
            Resolved::Absent => "absent",
            Resolved::List(_) => "list",
            Resolved::Set(_) => "set",
        }
    }

    fn type_error(&self, expected: &str) -> Error {
        Error::TypeError {
            expected: expected.into(),
            got: self.shape_name().into(),
        }
    }
}

impl Resolved<Value> {
    /// Plain JSON: single → value, absent → `null`, list and set → array.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Resolved::Single(v) => v.to_json(),
            Resolved::Absent => serde_json::Value::Null,
            Resolved::List(l) => l.iter().map(Value::to_json).collect(),
            Resolved::Set(s) => s.iter().map(Value::to_json).collect(),
        }
    }
}

// ============================================================================
// Conversions out of Resolved
// ============================================================================

/// Typed extraction of a [`Resolved`] value.
pub trait FromResolved<V: Eq + Hash>: Sized {
    fn from_resolved(resolved: Resolved<V>) -> Result<Self>;
}

impl<V: Eq + Hash> FromResolved<V> for Vec<V> {
    fn from_resolved(resolved: Resolved<V>) -> Result<Self> {
        match resolved {
            Resolved::List(l) => Ok(l),
            other => Err(other.type_error("list")),
        }
    }
}

impl<V: Eq + Hash> FromResolved<V> for HashSet<V> {
    fn from_resolved(resolved: Resolved<V>) -> Result<Self> {
        match resolved {
            Resolved::Set(s) => Ok(s),
            other => Err(other.type_error("set")),
        }
    }
}

impl<V: Eq + Hash> FromResolved<V> for Option<V> {
    /// `Single` → `Some`, `Absent` → `None`.
    fn from_resolved(resolved: Resolved<V>) -> Result<Self> {
        match resolved {
            Resolved::Single(v) => Ok(Some(v)),
            Resolved::Absent => Ok(None),
            other => Err(other.type_error("single")),
        }
    }
}

// ============================================================================
// Record
// ============================================================================

/// Flattened vertex properties, keyed by property key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record<V: Eq + Hash = Value> {
    entries: HashMap<String, Resolved<V>>,
}

impl<V: Eq + Hash> Default for Record<V> {
    fn default() -> Self {
        Self { entries: HashMap::new() }
    }
}

impl<V: Eq + Hash> Record<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity) }
    }

    pub(crate) fn insert(&mut self, key: String, value: Resolved<V>) {
        self.entries.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&Resolved<V>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Typed extraction of one key, e.g. `record.take::<Vec<Value>>("weapons")`.
    pub fn take<T: FromResolved<V>>(&mut self, key: &str) -> Result<T> {
        let resolved = self
            .entries
            .remove(key)
            .ok_or_else(|| Error::NotFound(format!("Property '{key}'")))?;
        T::from_resolved(resolved)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Resolved<V>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, Resolved<V>> {
        self.entries
    }
}

impl Record<Value> {
    fn resolved(&self, key: &str) -> Result<&Resolved<Value>> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("Property '{key}'")))
    }

    /// Single-valued key as a concrete scalar; `Ok(None)` when it had no entries.
    pub fn single<T: FromValue>(&self, key: &str) -> Result<Option<T>> {
        match self.resolved(key)? {
            Resolved::Single(v) => T::from_value(v).map(Some),
            Resolved::Absent => Ok(None),
            other => Err(other.type_error("single")),
        }
    }

    /// List-valued key with every element converted.
    pub fn list<T: FromValue>(&self, key: &str) -> Result<Vec<T>> {
        match self.resolved(key)? {
            Resolved::List(l) => l.iter().map(T::from_value).collect(),
            other => Err(other.type_error("list")),
        }
    }

    /// Plain JSON object, one field per property key.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl<V: Eq + Hash> IntoIterator for Record<V> {
    type Item = (String, Resolved<V>);
    type IntoIter = hashbrown::hash_map::IntoIter<String, Resolved<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<V: Eq + Hash> FromIterator<(String, Resolved<V>)> for Record<V> {
    fn from_iter<I: IntoIterator<Item = (String, Resolved<V>)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
