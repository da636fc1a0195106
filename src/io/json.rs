use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};
use crate::group::Group;
use crate::record::{Record, Value};

/// Read a JSON array of flat objects as records
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path.as_ref())?;
    let records = records_from_str(&text)?;
    log::info!("Read {} records from {}", records.len(), path.as_ref().display());
    Ok(records)
}

/// Parse a JSON array of flat objects as records
pub fn records_from_str(text: &str) -> Result<Vec<Record>> {
    let json_value: JsonValue = serde_json::from_str(text)?;

    match json_value {
        JsonValue::Array(array) => array
            .into_iter()
            .enumerate()
            .map(|(position, item)| match item {
                JsonValue::Object(map) => record_from_object(position, map),
                _ => Err(Error::Format(format!("element {} is not an object", position))),
            })
            .collect(),
        _ => Err(Error::Format("records must be a JSON array".to_string())),
    }
}

fn record_from_object(position: usize, map: Map<String, JsonValue>) -> Result<Record> {
    let mut record = Record::new();

    for (key, value) in map {
        let value = match value {
            JsonValue::Null => Value::Null,
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Number(n) => n.as_f64().map(Value::number).unwrap_or(Value::Null),
            other => {
                return Err(Error::Format(format!(
                    "record {} attribute '{}' must be a string, number or null, found {}",
                    position, key, other
                )))
            }
        };
        record.set(key, value);
    }

    Ok(record)
}

/// Read any JSON document, e.g. raw vectors or cube metadata
pub fn read_document<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

#[derive(Serialize)]
struct GroupView<'a> {
    differing_key: &'a str,
    spans_multiple_entities: bool,
    rows: Vec<&'a Record>,
}

/// Write groups as `[{differing_key, spans_multiple_entities, rows}]`
pub fn write_groups<P: AsRef<Path>>(path: P, groups: &[Group]) -> Result<()> {
    let views: Vec<GroupView<'_>> = groups
        .iter()
        .map(|group| GroupView {
            differing_key: group.differing_key(),
            spans_multiple_entities: group.spans_multiple_entities(),
            rows: group.rows().collect(),
        })
        .collect();
    write_pretty(path.as_ref(), &views)
}

/// Write records as a JSON array
pub fn write_records<P: AsRef<Path>>(path: P, records: &[Record]) -> Result<()> {
    write_pretty(path.as_ref(), &records)
}

// Writes to a temporary file next to the target and renames it into place.
fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    temp.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_from_str() {
        let records = records_from_str(
            r#"[{"Geography": "Canada", "Data_Value": 12, "Scalar": null}]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("Data_Value"), Some(&Value::Number(12.0)));
        assert_eq!(records[0].get("Scalar"), Some(&Value::Null));
    }

    #[test]
    fn test_rejects_nested_values() {
        assert!(matches!(
            records_from_str(r#"[{"a": [1, 2]}]"#),
            Err(Error::Format(_))
        ));
        assert!(matches!(records_from_str(r#"[1]"#), Err(Error::Format(_))));
        assert!(matches!(records_from_str(r#"{"a": 1}"#), Err(Error::Format(_))));
        assert!(matches!(records_from_str("not json"), Err(Error::Json(_))));
    }
}
