//! Flat observation records
//!
//! A record maps attribute names to values. Which attributes are dimensions
//! and which are measurements is decided by the caller's exclusion list, not
//! by the record itself.

mod value;

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use value::Value;

/// One observation: attribute name to value
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Record {
            fields: BTreeMap::new(),
        }
    }

    /// Add or replace an attribute, builder style
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Set an attribute, returning the previous value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Get an attribute value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Check whether the attribute exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Attribute names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over attributes in name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Number of attributes
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when both records carry exactly the same attribute names
    pub fn same_schema(&self, other: &Record) -> bool {
        self.fields.len() == other.fields.len() && self.fields.keys().eq(other.fields.keys())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let record = Record::new()
            .with("Geography", "Alberta")
            .with("RefPeriod", "2020-01-01")
            .with("Data_Value", 12.5);

        assert_eq!(record.len(), 3);
        assert_eq!(record.get("Geography"), Some(&Value::text("Alberta")));
        assert_eq!(record.get("Data_Value").and_then(Value::as_f64), Some(12.5));
        assert!(record.get("Missing").is_none());
    }

    #[test]
    fn test_same_schema() {
        let a = Record::new().with("A", 1).with("B", "x");
        let b = Record::new().with("B", "y").with("A", 2);
        let c = Record::new().with("A", 1).with("C", "x");

        assert!(a.same_schema(&b));
        assert!(!a.same_schema(&c));
        assert!(!a.same_schema(&Record::new().with("A", 1)));
    }

    #[test]
    fn test_json_shape_is_flat_object() {
        let record = Record::new().with("Year", 2020).with("Value", Value::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"Value":null,"Year":2020.0}"#);

        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
