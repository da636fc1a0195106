use csv::Writer;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::assemble::{DATA_VALUE, PER_CAPITA, PRODUCT_ID, REF_PERIOD, SCALAR, SCALED_VALUE, TITLE, VECTOR_ID};
use crate::error::Result;
use crate::intersection::IntersectionTable;
use crate::record::Record;

/// Write records as CSV
///
/// The header is the union of attribute names: identifying columns first,
/// then dimensions in first-seen order, then measurements. Absent attributes
/// are written as empty cells.
pub fn write_rows<P: AsRef<Path>>(path: P, rows: &[Record]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut wtr = Writer::from_writer(file);

    let headers = union_headers(rows);
    wtr.write_record(&headers)?;

    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        wtr.write_record(&cells)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write the intersection table as `attribute,value` rows
pub fn write_intersection<P: AsRef<Path>>(path: P, table: &IntersectionTable) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut wtr = Writer::from_writer(file);

    wtr.write_record(["attribute", "value"])?;
    for (attribute, values) in table.iter() {
        for value in values {
            wtr.write_record([attribute.as_str(), value.to_string().as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

const LEADING_COLUMNS: [&str; 4] = [PRODUCT_ID, TITLE, REF_PERIOD, VECTOR_ID];
const TRAILING_COLUMNS: [&str; 4] = [DATA_VALUE, SCALAR, SCALED_VALUE, PER_CAPITA];

fn union_headers(rows: &[Record]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut dimensions = Vec::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key) && !LEADING_COLUMNS.contains(&key) && !TRAILING_COLUMNS.contains(&key) {
                dimensions.push(key);
            }
        }
    }

    let leading = LEADING_COLUMNS.iter().copied().filter(|c| seen.contains(c));
    let trailing = TRAILING_COLUMNS.iter().copied().filter(|c| seen.contains(c));
    leading
        .chain(dimensions)
        .chain(trailing)
        .map(str::to_string)
        .collect()
}
