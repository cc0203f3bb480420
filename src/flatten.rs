//! Vertex property flattening.
//!
//! Resolves every property key of a vertex independently:
//!
//! ```text
//! Vertex { name: [Fred], roles: [hunter, gatherer], weapons: [spear, spear] }
//!   + policy { roles: set, weapons: list }
//!   → { name: Fred, roles: {hunter, gatherer}, weapons: [spear, spear] }
//! ```
//!
//! Keys the policy does not mention resolve as `single`. Keys the policy
//! mentions but the vertex lacks never show up in the record.

use std::hash::Hash;

use crate::model::*;
use crate::Result;

/// Flatten `vertex` into a record, one resolved value per property key.
///
/// `None` for `policy` resolves every key as [`Cardinality::Single`]. The
/// vertex is only read; every container in the returned record is new.
///
/// A `single` key with no entries resolves to [`Resolved::Absent`] rather
/// than being dropped from the record.
pub fn flatten<V>(vertex: &Vertex<V>, policy: Option<&CardinalityPolicy>) -> Record<V>
where
    V: Clone + Eq + Hash,
{
    let _span = tracing::debug_span!(
        "flatten",
        vertex = %vertex.id,
        label = %vertex.label,
        keys = vertex.len(),
    )
    .entered();

    let mut record = Record::with_capacity(vertex.len());
    for (key, entries) in &vertex.properties {
        let cardinality = policy.map_or(Cardinality::default(), |p| p.cardinality_of(key));
        let resolved = resolve(key, entries, cardinality);
        tracing::trace!(key = %key, %cardinality, values = resolved.len(), "resolved property");
        record.insert(key.clone(), resolved);
    }
    record
}

/// Flatten with a policy given as raw mode strings (`"single"`, `"list"`,
/// `"set"`).
///
/// All modes are validated before any key is resolved, so an unrecognized
/// mode yields [`Error::ConfigurationError`](crate::Error::ConfigurationError)
/// and no record at all.
pub fn flatten_with_modes<V, K, S>(
    vertex: &Vertex<V>,
    modes: impl IntoIterator<Item = (K, S)>,
) -> Result<Record<V>>
where
    V: Clone + Eq + Hash,
    K: Into<String>,
    S: AsRef<str>,
{
    let policy = CardinalityPolicy::from_modes(modes).inspect_err(|err| {
        tracing::warn!(vertex = %vertex.id, error = %err, "rejecting cardinality policy");
    })?;
    Ok(flatten(vertex, Some(&policy)))
}

impl<V: Clone + Eq + Hash> Vertex<V> {
    /// Method form of [`flatten`].
    pub fn flatten(&self, policy: Option<&CardinalityPolicy>) -> Record<V> {
        flatten(self, policy)
    }
}

/// Collapse one key's entries.
fn resolve<V>(key: &str, entries: &[PropertyEntry<V>], cardinality: Cardinality) -> Resolved<V>
where
    V: Clone + Eq + Hash,
{
    match cardinality {
        Cardinality::Single => match entries.first() {
            Some(first) => Resolved::Single(first.value.clone()),
            None => {
                tracing::debug!(key, "single-valued property has no entries");
                Resolved::Absent
            }
        },
        Cardinality::List => Resolved::List(entries.iter().map(|e| e.value.clone()).collect()),
        Cardinality::Set => Resolved::Set(entries.iter().map(|e| e.value.clone()).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use pretty_assertions::assert_eq;

    fn person() -> Vertex {
        Vertex::new(VertexId(0), "person")
            .with_property("name", "Fred")
            .with_property("roles", "hunter")
            .with_property("roles", "gatherer")
            .with_property("weapons", "spear")
            .with_property("weapons", "spear")
    }

    #[test]
    fn test_resolve_single_takes_first() {
        let v = person();
        let resolved = resolve("roles", v.entries("roles").unwrap(), Cardinality::Single);
        assert_eq!(resolved, Resolved::Single(Value::from("hunter")));
    }

    #[test]
    fn test_resolve_empty() {
        let entries: [PropertyEntry; 0] = [];
        assert_eq!(resolve("x", &entries, Cardinality::Single), Resolved::Absent);
        assert_eq!(resolve("x", &entries, Cardinality::List), Resolved::List(vec![]));
        assert_eq!(resolve("x", &entries, Cardinality::Set), Resolved::Set(HashSet::new()));
    }

    #[test]
    fn test_resolve_list_keeps_duplicates() {
        let v = person();
        let resolved = resolve("weapons", v.entries("weapons").unwrap(), Cardinality::List);
        assert_eq!(
            resolved,
            Resolved::List(vec![Value::from("spear"), Value::from("spear")])
        );
    }

    #[test]
    fn test_resolve_set_dedups() {
        let v = person();
        let resolved = resolve("weapons", v.entries("weapons").unwrap(), Cardinality::Set);
        let expected: HashSet<Value> = [Value::from("spear")].into_iter().collect();
        assert_eq!(resolved, Resolved::Set(expected));
    }

    #[test]
    fn test_flatten_without_policy() {
        let record = flatten(&person(), None);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("roles"), Some(&Resolved::Single(Value::from("hunter"))));
        assert_eq!(record.get("weapons"), Some(&Resolved::Single(Value::from("spear"))));
    }

    #[test]
    fn test_flatten_with_modes_rejects_before_resolving() {
        let err = flatten_with_modes(&person(), [("roles", "set"), ("name", "triple")]).unwrap_err();
        assert!(matches!(err, crate::Error::ConfigurationError { .. }));
    }

    #[test]
    fn test_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Vertex>();
        assert_send_sync::<CardinalityPolicy>();
        assert_send_sync::<Record>();
    }

    #[test]
    fn test_flatten_generic_values() {
        let v: Vertex<u32> = Vertex::new(VertexId(9), "counter")
            .with_property("hits", 3u32)
            .with_property("hits", 3u32)
            .with_property("hits", 5u32);
        let policy = CardinalityPolicy::new().with("hits", Cardinality::Set);
        let record = v.flatten(Some(&policy));
        assert_eq!(record.get("hits").unwrap().len(), 2);
    }
}
