//! Equality criteria used by attribute lookups

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::{Attributes, Value};

/// A flat conjunction of `attribute = value` conditions
///
/// Entries keep their insertion order so the generated predicates and the
/// logged context are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(Attributes);

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality condition; re-adding an attribute replaces its value
    pub fn eq(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.set(attribute, value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter()
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.0.get(attribute)
    }

    /// True when every condition holds for the given row
    pub fn matches(&self, row: &Attributes) -> bool {
        self.iter().all(|(name, expected)| row.get(name) == Some(expected))
    }

    pub fn as_attributes(&self) -> &Attributes {
        &self.0
    }
}

impl From<Attributes> for Criteria {
    fn from(attributes: Attributes) -> Self {
        Self(attributes)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&self.0).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
