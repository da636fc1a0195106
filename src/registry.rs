//! Group registry
//!
//! Runs the comparator over every ordered pair of records and assigns each
//! comparable pair to groups. Groups are looked up through an index keyed by
//! differing key and record identity instead of scanning every group.
//!
//! When the two records of a pair already sit in different groups with the
//! same differing key, both groups are extended and nothing is merged. The
//! pass reports this as [`PairOutcome::Extended`] with several group indices.

use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::compare::DimensionDiff;
use crate::config::GroupingConfig;
use crate::diagnostics::{DiagnosticSink, LoggingSink};
use crate::error::Result;
use crate::group::{AggregateSpec, Group};
use crate::intersection::IntersectionTable;
use crate::record::Record;

/// Identity of a distinct record value within one registry
pub type RecordId = usize;

/// What applying one comparable pair did to the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// No group matched, a new one was created at this index
    Created(usize),
    /// These existing groups matched and were extended, in index order
    Extended(Vec<usize>),
}

impl PairOutcome {
    /// True when one pair touched more than one group
    pub fn is_split(&self) -> bool {
        matches!(self, PairOutcome::Extended(groups) if groups.len() > 1)
    }
}

/// Builds groups incrementally from compared record pairs
#[derive(Debug)]
pub struct GroupRegistry {
    comparator: DimensionDiff,
    spec: Arc<AggregateSpec>,
    parallel: bool,
    sink: Arc<dyn DiagnosticSink>,
    groups: Vec<Group>,
    ids: HashMap<Record, RecordId>,
    // differing key -> record id -> indices of groups holding that record
    index: HashMap<String, HashMap<RecordId, Vec<usize>>>,
    split_pairs: usize,
}

impl GroupRegistry {
    /// Create an empty registry reporting diagnostics to the log
    pub fn new(config: &GroupingConfig) -> Self {
        GroupRegistry {
            comparator: config.comparator(),
            spec: config.aggregate_spec(),
            parallel: config.parallel,
            sink: Arc::new(LoggingSink),
            groups: Vec::new(),
            ids: HashMap::new(),
            index: HashMap::new(),
            split_pairs: 0,
        }
    }

    /// Route diagnostics to another sink
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Groups formed so far, in creation order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Consume the registry, returning its groups
    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Pairs whose records were found in more than one group with the same
    /// differing key
    pub fn split_pairs(&self) -> usize {
        self.split_pairs
    }

    /// Compare every ordered pair of `records` and apply the results
    ///
    /// Comparison may run in parallel; results are always applied in pair
    /// order by a single writer, so the groups formed do not depend on it.
    pub fn scan(&mut self, records: &[Record]) -> Result<()> {
        let ids: Vec<RecordId> = records.iter().map(|r| self.intern(r)).collect();
        let pairs = self.compare_all(records);
        log::info!(
            "Found {} comparable pairs among {} records",
            pairs.len(),
            records.len()
        );

        for (i, j, key) in pairs {
            self.apply(key, (ids[i], &records[i]), (ids[j], &records[j]))?;
        }

        log::info!(
            "Grouping produced {} groups ({} pairs extended several groups)",
            self.groups.len(),
            self.split_pairs
        );
        Ok(())
    }

    /// Compare one pair and apply the result
    ///
    /// Returns `None` when the records are incomparable.
    pub fn record_pair(&mut self, p: &Record, q: &Record) -> Result<Option<PairOutcome>> {
        let Some(key) = self.comparator.find_single_difference(p, q) else {
            return Ok(None);
        };
        let key = key.to_string();
        let pid = self.intern(p);
        let qid = self.intern(q);
        self.apply(&key, (pid, p), (qid, q)).map(Some)
    }

    fn compare_all<'r>(&self, records: &'r [Record]) -> Vec<(usize, usize, &'r str)> {
        let comparator = &self.comparator;
        let row = |i: usize| -> Vec<(usize, usize, &'r str)> {
            records
                .iter()
                .enumerate()
                .filter_map(|(j, q)| {
                    comparator
                        .find_single_difference(&records[i], q)
                        .map(|key| (i, j, key))
                })
                .collect()
        };

        let rows: Vec<Vec<(usize, usize, &'r str)>> = if self.parallel {
            (0..records.len()).into_par_iter().map(row).collect()
        } else {
            (0..records.len()).map(row).collect()
        };
        rows.into_iter().flatten().collect()
    }

    fn intern(&mut self, record: &Record) -> RecordId {
        if let Some(&id) = self.ids.get(record) {
            return id;
        }
        let id = self.ids.len();
        self.ids.insert(record.clone(), id);
        id
    }

    fn apply(&mut self, key: &str, p: (RecordId, &Record), q: (RecordId, &Record)) -> Result<PairOutcome> {
        let mut matches: Vec<usize> = self
            .index
            .get(key)
            .map(|by_record| {
                [p.0, q.0]
                    .iter()
                    .filter_map(|id| by_record.get(id))
                    .flatten()
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        matches.sort_unstable();
        matches.dedup();

        if matches.is_empty() {
            log::debug!("No group holds either record for key '{}', creating one", key);
            let group = Group::new(key, p.1.clone(), q.1.clone(), Arc::clone(&self.spec), self.sink.as_ref())?;
            let position = self.groups.len();
            self.groups.push(group);
            self.note_member(key, p.0, position);
            self.note_member(key, q.0, position);
            return Ok(PairOutcome::Created(position));
        }

        if matches.len() > 1 {
            log::warn!(
                "Pair belongs to {} separate groups varying by '{}'; extending each without merging",
                matches.len(),
                key
            );
            self.split_pairs += 1;
        }

        for &position in &matches {
            for (id, record) in [p, q] {
                if self.groups[position].add_member(record.clone(), self.sink.as_ref())? {
                    self.note_member(key, id, position);
                }
            }
        }
        Ok(PairOutcome::Extended(matches))
    }

    fn note_member(&mut self, key: &str, id: RecordId, position: usize) {
        self.index
            .entry(key.to_string())
            .or_default()
            .entry(id)
            .or_default()
            .push(position);
    }
}

/// Result of a full analysis pass
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Groups in creation order
    pub groups: Vec<Group>,
    /// Attributes shared by every record with their value domains
    pub intersection: IntersectionTable,
}

/// Group `records` with the given settings
pub fn group_records(records: &[Record], config: &GroupingConfig) -> Result<Vec<Group>> {
    let mut registry = GroupRegistry::new(config);
    registry.scan(records)?;
    Ok(registry.into_groups())
}

/// Group `records` and build the intersection table, reporting diagnostics
/// to `sink`
pub fn analyze(
    records: &[Record],
    config: &GroupingConfig,
    sink: Arc<dyn DiagnosticSink>,
) -> Result<Analysis> {
    let mut registry = GroupRegistry::new(config).with_sink(sink);
    registry.scan(records)?;
    Ok(Analysis {
        groups: registry.into_groups(),
        intersection: IntersectionTable::build(records),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::record::Value;

    fn config() -> GroupingConfig {
        GroupingConfig::default().with_entity_key(None)
    }

    fn point(geo: &str, year: i64, value: f64) -> Record {
        Record::new()
            .with("Geography", geo)
            .with("Year", year)
            .with("Data_Value", value)
    }

    #[test]
    fn test_record_pair_creates_then_extends() {
        let mut registry = GroupRegistry::new(&config());
        let a = point("Canada", 2020, 1.0);
        let b = point("Canada", 2021, 2.0);
        let c = point("Canada", 2022, 3.0);

        assert_eq!(registry.record_pair(&a, &b).unwrap(), Some(PairOutcome::Created(0)));
        assert_eq!(registry.record_pair(&b, &c).unwrap(), Some(PairOutcome::Extended(vec![0])));
        assert_eq!(registry.groups()[0].member_count(), 3);
        assert_eq!(registry.record_pair(&a, &a).unwrap(), None);
    }

    #[test]
    fn test_split_pair_extends_both_groups() {
        let mut registry = GroupRegistry::new(&config());
        let a = point("Canada", 2020, 1.0);
        let b = point("Canada", 2021, 2.0);
        let c = point("Canada", 2022, 3.0);
        let d = point("Canada", 2023, 4.0);

        // Two disjoint groups on the same key
        registry.record_pair(&a, &b).unwrap();
        registry.record_pair(&c, &d).unwrap();
        assert_eq!(registry.len(), 2);

        let outcome = registry.record_pair(&b, &c).unwrap().unwrap();
        assert_eq!(outcome, PairOutcome::Extended(vec![0, 1]));
        assert!(outcome.is_split());
        assert_eq!(registry.split_pairs(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.groups()[0].member_count(), 3);
        assert_eq!(registry.groups()[1].member_count(), 3);
    }

    #[test]
    fn test_different_keys_form_different_groups() {
        let mut registry = GroupRegistry::new(&config());
        let a = point("Canada", 2020, 1.0);
        let b = point("Canada", 2021, 2.0);
        let c = point("Alberta", 2020, 3.0);

        registry.record_pair(&a, &b).unwrap();
        assert_eq!(registry.record_pair(&a, &c).unwrap(), Some(PairOutcome::Created(1)));
        assert_eq!(registry.groups()[1].differing_key(), "Geography");
    }

    #[test]
    fn test_scan_collects_diagnostics() {
        let sink = Arc::new(CollectingSink::new());
        let records = vec![
            point("Canada", 2020, 1.0).with("Data_Value", Value::Null),
            point("Canada", 2021, 2.0),
        ];
        let analysis = analyze(&records, &config(), sink.clone()).unwrap();
        assert_eq!(analysis.groups.len(), 1);
        assert!(sink.aggregation_failures() > 0);
        assert_eq!(analysis.intersection.len(), 3);
    }
}
