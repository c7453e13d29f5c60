use std::{collections::BTreeMap, fmt::Debug, hash::Hash};

use serde::{Serialize, Serializer, ser::SerializeMap};

/// A subgraph field or filter key with a fixed wire name, e.g. `sender_contains`.
pub trait FieldName: Copy + Eq + Ord + Hash + Debug + Send + Sync + 'static {
    /// The name the subgraph knows this field by.
    fn name(&self) -> &'static str;
}

/// A set of filter predicates, keyed by filter key. An absent key is unconstrained.
///
/// All transformations are pure and return a new filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Filter<K: FieldName> {
    fields: BTreeMap<K, String>,
}

impl<K: FieldName> Default for Filter<K> {
    fn default() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }
}

impl<K: FieldName> Filter<K> {
    /// An unconstrained filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy with `key` set to `value`, replacing any previous value.
    pub fn with_field(&self, key: K, value: impl Into<String>) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key, value.into());
        Self { fields }
    }

    /// A copy without `key`.
    pub fn without_field(&self, key: K) -> Self {
        self.without_fields(&[key])
    }

    /// A copy without any of `keys`.
    pub fn without_fields(&self, keys: &[K]) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .filter(|(key, _)| !keys.contains(key))
                .map(|(key, value)| (*key, value.clone()))
                .collect(),
        }
    }

    /// A copy with every predicate of `other` applied on top, `other` winning on conflicts.
    pub fn merge(&self, other: impl IntoIterator<Item = (K, String)>) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(other);
        Self { fields }
    }

    /// The value for `key`, if constrained.
    pub fn get(&self, key: K) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }

    /// Whether `key` is constrained.
    pub fn contains(&self, key: K) -> bool {
        self.fields.contains_key(&key)
    }

    /// Iterate the predicates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &str)> + '_ {
        self.fields.iter().map(|(key, value)| (*key, value.as_str()))
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no predicates at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: FieldName> FromIterator<(K, String)> for Filter<K> {
    fn from_iter<I: IntoIterator<Item = (K, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Serializes as the subgraph `where` object, e.g. `{"receiver": "0x..", "currentFlowRate_gt": "0"}`.
impl<K: FieldName> Serialize for Filter<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key.name(), value)?;
        }
        map.end()
    }
}
