//! Regrouping of grouped rows into export partitions
//!
//! Groups overlap, so the same record can appear in several of them. For
//! export every group's rows are split by one attribute (typically the
//! product id) and each partition keeps a row only once.

use std::collections::{HashMap, HashSet};

use crate::group::Group;
use crate::record::Record;

/// Longest sheet name most spreadsheet tools accept
pub const SHEET_NAME_LIMIT: usize = 30;

/// Rows sharing one value of the partition attribute
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Partition attribute value, empty when rows lack the attribute
    pub key: String,
    /// Display name, see [`sheet_name`]
    pub label: String,
    pub rows: Vec<Record>,
}

/// Split the rows of `groups` by `attribute`
///
/// Partitions and rows keep first-seen order. The label of a partition is
/// built from its key and the `title_attribute` of its first row, if given.
pub fn partition_rows(groups: &[Group], attribute: &str, title_attribute: Option<&str>) -> Vec<Partition> {
    let mut partitions: Vec<Partition> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut seen: Vec<HashSet<&Record>> = Vec::new();

    for group in groups {
        for row in group.rows() {
            let key = row.get(attribute).map(|v| v.to_string()).unwrap_or_default();
            let position = *positions.entry(key.clone()).or_insert_with(|| {
                let title = title_attribute
                    .and_then(|t| row.get(t))
                    .map(|v| v.to_string());
                let label = match title {
                    Some(title) => sheet_name(&key, &title),
                    None => key.chars().take(SHEET_NAME_LIMIT).collect(),
                };
                log::debug!("Adding partition '{}'", label);
                partitions.push(Partition {
                    key: key.clone(),
                    label,
                    rows: Vec::new(),
                });
                seen.push(HashSet::new());
                partitions.len() - 1
            });

            if seen[position].insert(row) {
                partitions[position].rows.push(row.clone());
            }
        }
    }

    partitions
}

/// `"{id}-{title}"` cut to [`SHEET_NAME_LIMIT`] characters
pub fn sheet_name(id: &str, title: &str) -> String {
    format!("{}-{}", id, title).chars().take(SHEET_NAME_LIMIT).collect()
}
