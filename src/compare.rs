//! Dimension-diff comparison between two records

use std::collections::BTreeSet;

use crate::record::Record;

/// Finds the single dimension attribute on which two records disagree
///
/// Attributes named in the exclusion set (identifiers and measurements) are
/// never counted as differences. Values are compared exactly.
#[derive(Debug, Clone, Default)]
pub struct DimensionDiff {
    exclude: BTreeSet<String>,
}

impl DimensionDiff {
    /// Create a comparator with the given exclusion set
    pub fn new<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DimensionDiff {
            exclude: exclude.into_iter().map(Into::into).collect(),
        }
    }

    /// Check whether an attribute is excluded from differencing
    pub fn is_excluded(&self, key: &str) -> bool {
        self.exclude.contains(key)
    }

    /// Excluded attribute names
    pub fn excluded(&self) -> impl Iterator<Item = &str> {
        self.exclude.iter().map(String::as_str)
    }

    /// Return the one non-excluded attribute whose value differs between `a`
    /// and `b`.
    ///
    /// Returns `None` ("incomparable") when the records are identical, when
    /// their attribute names differ, or when zero or several dimension
    /// attributes differ.
    pub fn find_single_difference<'a>(&self, a: &'a Record, b: &Record) -> Option<&'a str> {
        if a == b || !a.same_schema(b) {
            return None;
        }

        let mut differing = None;
        // Same key sets, so both iterators walk the names in the same order
        for ((key, left), (_, right)) in a.iter().zip(b.iter()) {
            if self.is_excluded(key) || left == right {
                continue;
            }
            if differing.is_some() {
                return None;
            }
            differing = Some(key.as_str());
        }

        differing
    }
}
