//! Cardinality modes and the per-key policy that selects them.

use std::fmt;
use std::str::FromStr;

use hashbrown::HashMap;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// How the entries of one property key collapse into a single record value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// First stored entry wins.
    #[default]
    Single,
    /// Every entry, in stored order, duplicates kept.
    List,
    /// Distinct entries, order unspecified.
    Set,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::List => "list",
            Cardinality::Set => "set",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Cardinality {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mode = s.trim();
        if mode.eq_ignore_ascii_case("single") {
            Ok(Cardinality::Single)
        } else if mode.eq_ignore_ascii_case("list") {
            Ok(Cardinality::List)
        } else if mode.eq_ignore_ascii_case("set") {
            Ok(Cardinality::Set)
        } else {
            Err(Error::ConfigurationError { key: None, mode: s.to_owned() })
        }
    }
}

impl Serialize for Cardinality {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mode = String::deserialize(deserializer)?;
        mode.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// CardinalityPolicy
// ============================================================================

/// Per-key cardinality lookup table.
///
/// Keys the policy does not mention resolve to the fallback, which is
/// [`Cardinality::Single`] unless overridden with [`with_fallback`].
/// Mentioning a key the vertex lacks has no effect.
///
/// Serialized as a flat map of key to mode string, e.g.
/// `{"roles": "set", "weapons": "list"}`. A policy with a non-default
/// fallback uses `{"modes": {...}, "fallback": "list"}` instead. Both forms
/// deserialize; unknown modes are rejected.
///
/// [`with_fallback`]: CardinalityPolicy::with_fallback
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardinalityPolicy {
    modes: HashMap<String, Cardinality>,
    fallback: Cardinality,
}

impl CardinalityPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, cardinality: Cardinality) -> Self {
        self.modes.insert(key.into(), cardinality);
        self
    }

    /// Cardinality applied to keys the policy does not mention.
    pub fn with_fallback(mut self, fallback: Cardinality) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, cardinality: Cardinality) -> Option<Cardinality> {
        self.modes.insert(key.into(), cardinality)
    }

    /// Build a policy from raw mode strings.
    ///
    /// Every mode is validated before the policy is returned; the first
    /// unrecognized one fails the whole build.
    pub fn from_modes<K, S>(modes: impl IntoIterator<Item = (K, S)>) -> Result<Self>
    where
        K: Into<String>,
        S: AsRef<str>,
    {
        let mut policy = Self::new();
        for (key, mode) in modes {
            let key = key.into();
            let cardinality = mode.as_ref().parse::<Cardinality>().map_err(|_| {
                Error::ConfigurationError {
                    key: Some(key.clone()),
                    mode: mode.as_ref().to_owned(),
                }
            })?;
            policy.modes.insert(key, cardinality);
        }
        Ok(policy)
    }

    /// Resolve the cardinality for `key`.
    pub fn cardinality_of(&self, key: &str) -> Cardinality {
        self.modes.get(key).copied().unwrap_or(self.fallback)
    }

    /// Explicit mode for `key`, if the policy mentions it.
    pub fn get(&self, key: &str) -> Option<Cardinality> {
        self.modes.get(key).copied()
    }

    pub fn fallback(&self) -> Cardinality {
        self.fallback
    }

    pub fn len(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }
}

impl Serialize for CardinalityPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.fallback == Cardinality::default() {
            return self.modes.serialize(serializer);
        }
        let mut st = serializer.serialize_struct("CardinalityPolicy", 2)?;
        st.serialize_field("modes", &self.modes)?;
        st.serialize_field("fallback", &self.fallback)?;
        st.end()
    }
}

/// One top-level value of a serialized policy: a mode string in the flat
/// form, or the `modes` table in the structured form.
#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyField {
    Mode(String),
    Modes(HashMap<String, String>),
}

impl<'de> Deserialize<'de> for CardinalityPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        use serde::de::Error as _;

        let fields = HashMap::<String, PolicyField>::deserialize(deserializer)?;

        if !matches!(fields.get("modes"), Some(PolicyField::Modes(_))) {
            let modes = fields
                .into_iter()
                .map(|(key, field)| match field {
                    PolicyField::Mode(mode) => Ok((key, mode)),
                    PolicyField::Modes(_) => Err(D::Error::custom(format!(
                        "expected a cardinality mode for key '{key}'"
                    ))),
                })
                .collect::<std::result::Result<Vec<_>, _>>()?;
            return CardinalityPolicy::from_modes(modes).map_err(D::Error::custom);
        }

        let mut policy = CardinalityPolicy::new();
        for (name, field) in fields {
            match (name.as_str(), field) {
                ("modes", PolicyField::Modes(modes)) => {
                    policy.modes = CardinalityPolicy::from_modes(modes)
                        .map_err(D::Error::custom)?
                        .modes;
                }
                ("fallback", PolicyField::Mode(mode)) => {
                    policy.fallback = mode.parse().map_err(D::Error::custom)?;
                }
                (other, _) => {
                    return Err(D::Error::custom(format!("unexpected policy field '{other}'")));
                }
            }
        }
        Ok(policy)
    }
}

impl<K: Into<String>> FromIterator<(K, Cardinality)> for CardinalityPolicy {
    fn from_iter<I: IntoIterator<Item = (K, Cardinality)>>(iter: I) -> Self {
        Self {
            modes: iter.into_iter().map(|(k, c)| (k.into(), c)).collect(),
            fallback: Cardinality::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_modes() {
        assert_eq!("single".parse::<Cardinality>().unwrap(), Cardinality::Single);
        assert_eq!("LIST".parse::<Cardinality>().unwrap(), Cardinality::List);
        assert_eq!(" set ".parse::<Cardinality>().unwrap(), Cardinality::Set);
    }

    #[test]
    fn test_parse_unknown_mode() {
        let err = "triple".parse::<Cardinality>().unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigurationError { key: None, ref mode } if mode == "triple"
        ));
    }

    #[test]
    fn test_default_is_single() {
        assert_eq!(Cardinality::default(), Cardinality::Single);
        assert_eq!(CardinalityPolicy::new().cardinality_of("anything"), Cardinality::Single);
    }

    #[test]
    fn test_lookup_and_fallback() {
        let policy = CardinalityPolicy::new()
            .with("roles", Cardinality::Set)
            .with_fallback(Cardinality::List);
        assert_eq!(policy.cardinality_of("roles"), Cardinality::Set);
        assert_eq!(policy.cardinality_of("weapons"), Cardinality::List);
        assert_eq!(policy.get("weapons"), None);
        assert_eq!(policy.fallback(), Cardinality::List);
    }

    #[test]
    fn test_from_modes_reports_key() {
        let err = CardinalityPolicy::from_modes([("roles", "set"), ("name", "triple")]).unwrap_err();
        match err {
            Error::ConfigurationError { key, mode } => {
                assert_eq!(key.as_deref(), Some("name"));
                assert_eq!(mode, "triple");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_iterator() {
        let policy: CardinalityPolicy =
            [("roles", Cardinality::Set), ("weapons", Cardinality::List)].into_iter().collect();
        assert_eq!(policy.len(), 2);
        assert_eq!(policy.cardinality_of("weapons"), Cardinality::List);
    }

    #[test]
    fn test_serde_roundtrip() {
        let policy: CardinalityPolicy =
            serde_json::from_str(r#"{"roles": "set", "weapons": "list"}"#).unwrap();
        assert_eq!(policy.cardinality_of("roles"), Cardinality::Set);
        assert_eq!(policy.cardinality_of("name"), Cardinality::Single);

        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["weapons"], "list");
    }

    #[test]
    fn test_serde_keeps_fallback() {
        let policy = CardinalityPolicy::new()
            .with("name", Cardinality::Single)
            .with_fallback(Cardinality::List);

        let json = serde_json::to_string(&policy).unwrap();
        let back: CardinalityPolicy = serde_json::from_str(&json).unwrap();

        assert_eq!(back, policy);
        assert_eq!(back.cardinality_of("roles"), Cardinality::List);
    }

    #[test]
    fn test_serde_structured_form() {
        let policy: CardinalityPolicy =
            serde_json::from_str(r#"{"modes": {"roles": "set"}, "fallback": "list"}"#).unwrap();
        assert_eq!(policy.cardinality_of("roles"), Cardinality::Set);
        assert_eq!(policy.fallback(), Cardinality::List);

        let only_modes: CardinalityPolicy =
            serde_json::from_str(r#"{"modes": {"roles": "set"}}"#).unwrap();
        assert_eq!(only_modes.fallback(), Cardinality::Single);
        assert_eq!(only_modes.len(), 1);
    }

    #[test]
    fn test_serde_flat_form_allows_fallback_as_key() {
        // Without a `modes` table every entry is a property key.
        let policy: CardinalityPolicy =
            serde_json::from_str(r#"{"fallback": "set", "modes": "list"}"#).unwrap();
        assert_eq!(policy.cardinality_of("fallback"), Cardinality::Set);
        assert_eq!(policy.cardinality_of("modes"), Cardinality::List);
        assert_eq!(policy.fallback(), Cardinality::Single);
    }

    #[test]
    fn test_serde_rejects_stray_structured_field() {
        let err = serde_json::from_str::<CardinalityPolicy>(
            r#"{"modes": {"roles": "set"}, "roles": "list"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unexpected policy field 'roles'"));
    }

    #[test]
    fn test_serde_rejects_unknown_fallback() {
        let err = serde_json::from_str::<CardinalityPolicy>(
            r#"{"modes": {}, "fallback": "bag"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("'bag'"));
    }

    #[test]
    fn test_serde_rejects_unknown_mode() {
        let err = serde_json::from_str::<CardinalityPolicy>(r#"{"name": "triple"}"#).unwrap_err();
        assert!(err.to_string().contains("triple"));
    }
}
