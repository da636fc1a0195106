//! Non-fatal diagnostics raised while groups are built
//!
//! Aggregation failures and groups that span several entities never stop a
//! grouping pass. They are handed to a [`DiagnosticSink`] instead, which by
//! default writes them to the log.

use std::fmt;
use std::sync::Mutex;

use crate::group::AggregationFailure;
use crate::record::Value;

/// A diagnostic emitted by group maintenance
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A summary field could not be averaged and was set to null
    AggregationFailure {
        differing_key: String,
        field: String,
        failure: AggregationFailure,
    },
    /// Group members disagree on an attribute expected to be invariant
    CrossEntityGroup {
        differing_key: String,
        attribute: String,
        expected: Value,
        found: Value,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AggregationFailure {
                differing_key,
                field,
                failure,
            } => write!(
                f,
                "could not average '{}' in group varying by '{}': {}",
                field, differing_key, failure
            ),
            Diagnostic::CrossEntityGroup {
                differing_key,
                attribute,
                expected,
                found,
            } => write!(
                f,
                "group varying by '{}' spans several '{}' values ({} and {})",
                differing_key, attribute, expected, found
            ),
        }
    }
}

/// Receives diagnostics from the grouping engine
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    /// Called once per diagnostic
    fn report(&self, diagnostic: &Diagnostic);
}

/// Writes diagnostics to the `log` facade
#[derive(Debug, Default)]
pub struct LoggingSink;

impl DiagnosticSink for LoggingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::AggregationFailure { .. } => log::error!("{}", diagnostic),
            Diagnostic::CrossEntityGroup { .. } => log::warn!("{}", diagnostic),
        }
    }
}

/// Keeps diagnostics in memory for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything reported so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of aggregation failures reported
    pub fn aggregation_failures(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::AggregationFailure { .. }))
    }

    /// Number of cross-entity warnings reported
    pub fn cross_entity_warnings(&self) -> usize {
        self.count(|d| matches!(d, Diagnostic::CrossEntityGroup { .. }))
    }

    pub fn len(&self) -> usize {
        self.count(|_| true)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn count(&self, pred: impl Fn(&Diagnostic) -> bool) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|d| pred(d))
            .count()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::debug!("collected diagnostic: {}", diagnostic);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_counts() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.report(&Diagnostic::AggregationFailure {
            differing_key: "Year".to_string(),
            field: "Data_Value".to_string(),
            failure: AggregationFailure::Empty,
        });
        sink.report(&Diagnostic::CrossEntityGroup {
            differing_key: "Year".to_string(),
            attribute: "ProductId".to_string(),
            expected: Value::Number(1.0),
            found: Value::Number(2.0),
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.aggregation_failures(), 1);
        assert_eq!(sink.cross_entity_warnings(), 1);
    }

    #[test]
    fn test_display_mentions_field_and_key() {
        let text = Diagnostic::AggregationFailure {
            differing_key: "Year".to_string(),
            field: "Data_Value".to_string(),
            failure: AggregationFailure::Empty,
        }
        .to_string();
        assert!(text.contains("Data_Value"));
        assert!(text.contains("Year"));
    }
}
