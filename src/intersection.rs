//! Global intersection table
//!
//! Attributes present in every record, each with the set of distinct values
//! observed across the whole population. Built independently of grouping and
//! used as a reference sheet by exporters.

use std::collections::{btree_map, BTreeMap, BTreeSet};

use crate::record::{Record, Value};

/// Attribute to observed value domain, restricted to shared attributes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntersectionTable {
    entries: BTreeMap<String, BTreeSet<Value>>,
}

impl IntersectionTable {
    /// Build the table in a single pass over `records`
    pub fn build(records: &[Record]) -> Self {
        let Some(first) = records.first() else {
            return IntersectionTable::default();
        };

        let mut entries: BTreeMap<String, BTreeSet<Value>> = first
            .keys()
            .filter(|key| records.iter().all(|r| r.contains_key(key)))
            .map(|key| (key.to_string(), BTreeSet::new()))
            .collect();

        for record in records {
            for (key, values) in entries.iter_mut() {
                if let Some(value) = record.get(key) {
                    values.insert(value.clone());
                }
            }
        }

        log::debug!(
            "Intersection table: {} shared attributes over {} records",
            entries.len(),
            records.len()
        );
        IntersectionTable { entries }
    }

    /// Attributes common to every record
    pub fn shared_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Distinct values observed for a shared attribute
    pub fn values(&self, key: &str) -> Option<&BTreeSet<Value>> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, BTreeSet<Value>> {
        self.entries.iter()
    }

    /// Number of shared attributes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_attribute_values() {
        let records = vec![
            Record::new().with("Region", "A").with("Year", 2020),
            Record::new().with("Region", "A").with("Year", 2021).with("Note", "x"),
            Record::new().with("Region", "B").with("Year", 2020),
        ];
        let table = IntersectionTable::build(&records);

        let regions: Vec<&Value> = table.values("Region").unwrap().iter().collect();
        assert_eq!(regions, vec![&Value::text("A"), &Value::text("B")]);
        assert_eq!(table.values("Year").unwrap().len(), 2);
        assert!(!table.contains_key("Note"));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_empty_population() {
        assert!(IntersectionTable::build(&[]).is_empty());
    }

    #[test]
    fn test_disjoint_schemas() {
        let records = vec![Record::new().with("A", 1), Record::new().with("B", 1)];
        assert!(IntersectionTable::build(&records).is_empty());
    }
}
