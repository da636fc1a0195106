//! Record assembly
//!
//! Flattens raw vector observations into [`Record`]s: each coordinate member
//! becomes a named dimension attribute, values are scaled by their scalar
//! factor and optionally divided by a matching population figure.
//! Fetching the raw documents is left to the caller.

mod raw;

use std::collections::HashMap;

use crate::cache::LookupCache;
use crate::error::{Error, Result};
use crate::record::{Record, Value};

pub use raw::{CubeMetadata, Dimension, Member, RawDataPoint, RawVector, ScalarCode};

pub const PRODUCT_ID: &str = "ProductId";
pub const TITLE: &str = "Title";
pub const REF_PERIOD: &str = "RefPeriod";
pub const VECTOR_ID: &str = "VectorId";
pub const DATA_VALUE: &str = "Data_Value";
pub const SCALAR: &str = "Scalar";
pub const SCALED_VALUE: &str = "Scaled Value";
pub const PER_CAPITA: &str = "Value Per Capita";
pub const GEOGRAPHY: &str = "Geography";

/// Dimension `Value` is renamed so it cannot collide with the measurement
pub const VALUE_DIMENSION: &str = "Value_desc";

/// Supplies cube metadata by product id
pub trait MetadataSource {
    fn cube_metadata(&self, product_id: i64) -> Result<CubeMetadata>;
}

/// Metadata source backed by an in-memory list, e.g. loaded from a file
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    cubes: HashMap<i64, CubeMetadata>,
}

impl StaticMetadataSource {
    pub fn new(cubes: Vec<CubeMetadata>) -> Self {
        StaticMetadataSource {
            cubes: cubes.into_iter().map(|c| (c.product_id, c)).collect(),
        }
    }
}

impl MetadataSource for StaticMetadataSource {
    fn cube_metadata(&self, product_id: i64) -> Result<CubeMetadata> {
        self.cubes
            .get(&product_id)
            .cloned()
            .ok_or_else(|| Error::KeyNotFound(format!("metadata for product {}", product_id)))
    }
}

/// Turns raw vectors into flat records
#[derive(Debug)]
pub struct Assembler<S> {
    source: S,
    cache: LookupCache<i64, CubeMetadata>,
    scale_codes: Vec<ScalarCode>,
    population: Vec<Record>,
}

impl<S: MetadataSource> Assembler<S> {
    pub fn new(source: S) -> Self {
        Assembler {
            source,
            cache: LookupCache::new(),
            scale_codes: Vec::new(),
            population: Vec::new(),
        }
    }

    /// Descriptions used for the `Scalar` attribute
    pub fn with_scale_codes(mut self, codes: Vec<ScalarCode>) -> Self {
        self.scale_codes = codes;
        self
    }

    /// Population records used to derive per-capita values
    pub fn with_population(mut self, population: Vec<Record>) -> Self {
        self.population = population;
        self
    }

    /// Metadata cache, for inspection
    pub fn cache(&self) -> &LookupCache<i64, CubeMetadata> {
        &self.cache
    }

    /// Assemble every data point of every vector
    pub fn assemble(&mut self, vectors: &[RawVector]) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for vector in vectors {
            let product_id = vector.product_id;
            let source = &self.source;
            let metadata = self
                .cache
                .get_or_try_insert_with(product_id, || source.cube_metadata(product_id))?;
            let dimensions = dimension_attributes(vector, metadata)?;

            for point in &vector.vector_data_point {
                let mut record = Record::new()
                    .with(PRODUCT_ID, product_id)
                    .with(TITLE, metadata.cube_title_en.as_str())
                    .with(REF_PERIOD, point.ref_per.as_str())
                    .with(VECTOR_ID, vector.vector_id);
                for (name, member) in &dimensions {
                    record.set(name.as_str(), member.as_str());
                }
                apply_value(&mut record, point, &self.scale_codes);
                if !self.population.is_empty() {
                    apply_per_capita(&mut record, &self.population);
                }

                log::debug!(
                    "Assembled data point: vector {} period {}",
                    vector.vector_id,
                    point.ref_per
                );
                records.push(record);
            }
        }

        log::info!(
            "Assembled {} records from {} vectors ({} metadata lookups cached)",
            records.len(),
            vectors.len(),
            self.cache.len()
        );
        Ok(records)
    }
}

// Positions past the cube's dimension count are padding and are ignored.
fn dimension_attributes(vector: &RawVector, metadata: &CubeMetadata) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();

    for (position, part) in vector.coordinate.split('.').enumerate() {
        if position >= metadata.dimension.len() {
            break;
        }
        let member_id: i64 = part.trim().parse().map_err(|_| {
            Error::Format(format!(
                "vector {} has non-numeric coordinate '{}'",
                vector.vector_id, vector.coordinate
            ))
        })?;

        match metadata.member_name(position, member_id) {
            Some((dimension, member)) => attributes.push(clean_names(dimension, member)),
            None => log::warn!(
                "Product {} has no member {} in dimension {}",
                metadata.product_id,
                member_id,
                position
            ),
        }
    }

    Ok(attributes)
}

// Some cubes repeat the dimension in member names as "Dimension: member";
// the prefix then replaces the dimension name.
fn clean_names(dimension: &str, member: &str) -> (String, String) {
    let (dimension, member) = match member.split_once(": ") {
        Some((prefix, name)) => (prefix.to_string(), capitalize(name)),
        None => (dimension.to_string(), member.to_string()),
    };

    if dimension == "Value" {
        (VALUE_DIMENSION.to_string(), member)
    } else {
        (dimension, member)
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn apply_value(record: &mut Record, point: &RawDataPoint, scale_codes: &[ScalarCode]) {
    record.set(DATA_VALUE, point.value);

    let code = point.scalar_factor_code;
    let Some(value) = point.value else {
        return;
    };
    if code <= 0 {
        return;
    }

    let description = scale_codes
        .iter()
        .find(|c| c.scalar_factor_code == code)
        .map(|c| c.scalar_factor_desc_en.clone());
    record.set(SCALAR, description);
    record.set(SCALED_VALUE, value * 10f64.powi(code));
}

fn apply_per_capita(record: &mut Record, population: &[Record]) {
    let numerator = record
        .get(SCALED_VALUE)
        .and_then(Value::as_f64)
        .or_else(|| record.get(DATA_VALUE).and_then(Value::as_f64));
    let Some(numerator) = numerator else {
        return;
    };

    let geography = record.get(GEOGRAPHY);
    let period = record.get(REF_PERIOD);
    let matching = population
        .iter()
        .find(|p| p.get(GEOGRAPHY) == geography && p.get(REF_PERIOD) == period);

    let Some(reference) = matching else {
        log::error!(
            "No population figure for geography {:?} and period {:?}",
            geography,
            period
        );
        return;
    };

    match reference.get(DATA_VALUE).and_then(Value::as_f64) {
        Some(denominator) if denominator != 0.0 => {
            record.set(PER_CAPITA, numerator / denominator);
        }
        _ => log::warn!("Population figure for {:?} is missing or zero", geography),
    }
}
