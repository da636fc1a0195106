//! Groups of records that differ only in one attribute
//!
//! A group owns its member records plus exactly one summary entry holding
//! the mean of the members' measurement fields. Entries are tagged, so a
//! member whose differing-key value happens to equal the summary label is
//! never mistaken for the summary.

mod aggregate;

use std::sync::Arc;

use serde::Serialize;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{Error, Result};
use crate::record::{Record, Value};

pub use aggregate::{field_mean, AggregateSpec, AggregationFailure};

/// Label used for summary records unless configured otherwise
pub const SUMMARY_LABEL: &str = "Mean (Average)";

/// One entry of a group
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum GroupEntry {
    /// An observed record
    Member(Record),
    /// The synthetic aggregate record
    Summary(Record),
}

impl GroupEntry {
    /// The underlying record
    pub fn record(&self) -> &Record {
        match self {
            GroupEntry::Member(r) | GroupEntry::Summary(r) => r,
        }
    }

    pub fn is_summary(&self) -> bool {
        matches!(self, GroupEntry::Summary(_))
    }
}

/// A cluster of records varying only in `differing_key`
#[derive(Debug, Clone)]
pub struct Group {
    differing_key: String,
    entries: Vec<GroupEntry>,
    spec: Arc<AggregateSpec>,
    cross_entity: bool,
}

impl Group {
    /// Create a group seeded with a compared pair
    ///
    /// The summary entry is created straight away and placed after the seed
    /// records.
    pub fn new(
        differing_key: impl Into<String>,
        first: Record,
        second: Record,
        spec: Arc<AggregateSpec>,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self> {
        let mut group = Group {
            differing_key: differing_key.into(),
            entries: Vec::with_capacity(4),
            spec,
            cross_entity: false,
        };

        group.entries.push(GroupEntry::Member(first));
        if !group.contains(&second) {
            group.entries.push(GroupEntry::Member(second));
        }
        group.get_or_create_summary(sink)?;

        log::info!(
            "Created group varying by '{}' with {} entries",
            group.differing_key,
            group.entries.len()
        );
        Ok(group)
    }

    /// The attribute whose value varies across members
    pub fn differing_key(&self) -> &str {
        &self.differing_key
    }

    /// All entries in insertion order, summary included
    pub fn entries(&self) -> &[GroupEntry] {
        &self.entries
    }

    /// All records in insertion order, summary included
    pub fn rows(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().map(GroupEntry::record)
    }

    /// Observed members, summary excluded
    pub fn members(&self) -> impl Iterator<Item = &Record> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Member(r) => Some(r),
            GroupEntry::Summary(_) => None,
        })
    }

    /// Number of entries, summary included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of observed members
    pub fn member_count(&self) -> usize {
        self.members().count()
    }

    /// Whether members disagree on the configured entity attribute
    pub fn spans_multiple_entities(&self) -> bool {
        self.cross_entity
    }

    /// Check membership by full field equality
    pub fn contains(&self, record: &Record) -> bool {
        self.members().any(|member| member == record)
    }

    /// The summary record
    pub fn summary(&self) -> Result<&Record> {
        self.entries
            .iter()
            .find_map(|entry| match entry {
                GroupEntry::Summary(r) => Some(r),
                GroupEntry::Member(_) => None,
            })
            .ok_or_else(|| self.missing_summary())
    }

    /// Add a record unless an equal one is already present
    ///
    /// Returns `true` when the record was added. Every addition recomputes
    /// the summary.
    pub fn add_member(&mut self, record: Record, sink: &dyn DiagnosticSink) -> Result<bool> {
        if self.contains(&record) {
            return Ok(false);
        }

        log::debug!("Adding record to group varying by '{}'", self.differing_key);
        self.check_entity(&record, sink);
        self.entries.push(GroupEntry::Member(record));
        self.recompute(sink)?;
        Ok(true)
    }

    /// Return the summary, creating it from the first member if absent
    pub fn get_or_create_summary(&mut self, sink: &dyn DiagnosticSink) -> Result<&Record> {
        if !self.entries.iter().any(GroupEntry::is_summary) {
            let mut summary = self
                .members()
                .next()
                .cloned()
                .ok_or_else(|| Error::InvalidInput("cannot summarise an empty group".to_string()))?;

            let members: Vec<Record> = self.members().cloned().collect();
            for member in &members {
                self.check_entity(member, sink);
            }

            summary.set(self.differing_key.clone(), self.spec.summary_label.as_str());
            self.entries.push(GroupEntry::Summary(summary));
            self.recompute(sink)?;
        }

        self.summary()
    }

    /// Recompute summary means from the current members
    ///
    /// A field that cannot be averaged is set to null and reported to the sink.
    pub fn recompute(&mut self, sink: &dyn DiagnosticSink) -> Result<()> {
        let primary = self.spec.primary_field.clone();
        let primary_mean = self.mean_or_report(&primary, sink);

        let secondary = match &self.spec.secondary_field {
            Some(field) if self.members().next().is_some_and(|m| m.contains_key(field)) => {
                let mean = self.mean_or_report(field, sink);
                Some((field.clone(), mean))
            }
            _ => None,
        };

        let summary = self.summary_mut()?;
        summary.set(primary, primary_mean);
        if let Some((field, mean)) = secondary {
            summary.set(field, mean);
        }
        Ok(())
    }

    fn mean_or_report(&self, field: &str, sink: &dyn DiagnosticSink) -> Value {
        match field_mean(self.members(), field) {
            Ok(mean) => Value::number(mean),
            Err(failure) => {
                sink.report(&Diagnostic::AggregationFailure {
                    differing_key: self.differing_key.clone(),
                    field: field.to_string(),
                    failure,
                });
                Value::Null
            }
        }
    }

    fn summary_mut(&mut self) -> Result<&mut Record> {
        let differing_key = &self.differing_key;
        self.entries
            .iter_mut()
            .find_map(|entry| match entry {
                GroupEntry::Summary(r) => Some(r),
                GroupEntry::Member(_) => None,
            })
            .ok_or_else(|| Error::MissingSummary {
                differing_key: differing_key.clone(),
            })
    }

    fn missing_summary(&self) -> Error {
        Error::MissingSummary {
            differing_key: self.differing_key.clone(),
        }
    }

    // Reports the first disagreement only; later ones add nothing for review.
    fn check_entity(&mut self, record: &Record, sink: &dyn DiagnosticSink) {
        let Some(attribute) = self.spec.entity_key.as_deref() else {
            return;
        };
        if self.cross_entity || attribute == self.differing_key {
            return;
        }
        let Some(expected) = self.members().next().and_then(|m| m.get(attribute)) else {
            return;
        };
        let Some(found) = record.get(attribute) else {
            return;
        };

        if expected != found {
            sink.report(&Diagnostic::CrossEntityGroup {
                differing_key: self.differing_key.clone(),
                attribute: attribute.to_string(),
                expected: expected.clone(),
                found: found.clone(),
            });
            self.cross_entity = true;
        }
    }
}
