//! Mean aggregation over group members

use std::fmt;

use crate::record::{Record, Value};

/// Why a mean could not be computed
#[derive(Debug, Clone, PartialEq)]
pub enum AggregationFailure {
    /// No members to average
    Empty,
    /// A member lacks the measurement field
    Missing { position: usize },
    /// A member's measurement is null or text
    NonNumeric { position: usize, found: Value },
}

impl fmt::Display for AggregationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationFailure::Empty => write!(f, "no values to average"),
            AggregationFailure::Missing { position } => {
                write!(f, "member {} has no value for the field", position)
            }
            AggregationFailure::NonNumeric { position, found } => {
                write!(f, "member {} has non-numeric value '{:?}'", position, found)
            }
        }
    }
}

/// Which fields a group averages and how its summary is labelled
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    /// Primary measurement field
    pub primary_field: String,
    /// Optional scaled measurement field
    pub secondary_field: Option<String>,
    /// Label written into the differing key of the summary record
    pub summary_label: String,
    /// Attribute expected to be constant across a group
    pub entity_key: Option<String>,
}

/// Arithmetic mean of `field` over the given records
pub fn field_mean<'a, I>(records: I, field: &str) -> Result<f64, AggregationFailure>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut sum = 0.0;
    let mut count = 0usize;

    for (position, record) in records.into_iter().enumerate() {
        match record.get(field) {
            Some(Value::Number(n)) => {
                sum += n;
                count += 1;
            }
            Some(other) => {
                return Err(AggregationFailure::NonNumeric {
                    position,
                    found: other.clone(),
                })
            }
            None => return Err(AggregationFailure::Missing { position }),
        }
    }

    if count == 0 {
        return Err(AggregationFailure::Empty);
    }

    Ok(sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_value(v: impl Into<Value>) -> Record {
        Record::new().with("Data_Value", v)
    }

    #[test]
    fn test_mean() {
        let records = vec![with_value(10), with_value(20), with_value(30)];
        assert_eq!(field_mean(&records, "Data_Value"), Ok(20.0));
    }

    #[test]
    fn test_empty_input() {
        let records: Vec<Record> = Vec::new();
        assert_eq!(field_mean(&records, "Data_Value"), Err(AggregationFailure::Empty));
    }

    #[test]
    fn test_null_and_text_values() {
        let records = vec![with_value(10), with_value(Value::Null)];
        assert_eq!(
            field_mean(&records, "Data_Value"),
            Err(AggregationFailure::NonNumeric {
                position: 1,
                found: Value::Null
            })
        );

        let records = vec![with_value("ten")];
        assert!(matches!(
            field_mean(&records, "Data_Value"),
            Err(AggregationFailure::NonNumeric { position: 0, .. })
        ));
    }

    #[test]
    fn test_missing_field() {
        let records = vec![with_value(1), Record::new().with("Other", 1)];
        assert_eq!(
            field_mean(&records, "Data_Value"),
            Err(AggregationFailure::Missing { position: 1 })
        );
    }
}
