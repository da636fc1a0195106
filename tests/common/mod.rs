//! Common test fixtures
//!
//! Builders for observation records shaped like assembled statistics data.

#![allow(dead_code)]

use dimgroup::{GroupingConfig, Record, Value};

/// An observation for one product, geography and year
pub fn observation(product: i64, geography: &str, year: i64, value: impl Into<Value>) -> Record {
    Record::new()
        .with("ProductId", product)
        .with("Title", "Test cube")
        .with("Geography", geography)
        .with("RefPeriod", year)
        .with("VectorId", 100 + product)
        .with("Data_Value", value)
}

/// A series of observations varying only in the year
pub fn yearly_series(geography: &str, years: &[i64], values: &[f64]) -> Vec<Record> {
    years
        .iter()
        .zip(values)
        .map(|(year, value)| observation(1, geography, *year, *value))
        .collect()
}

/// Default settings without the cross-entity check
pub fn config() -> GroupingConfig {
    GroupingConfig::default().with_entity_key(None)
}
