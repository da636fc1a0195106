//! Grouping configuration
//!
//! Settings can be built in code or loaded from a TOML file. Every field has
//! a default, so a config file only needs the values it changes:
//!
//! ```toml
//! exclude = ["VectorId", "Data_Value", "Scaled Value"]
//! primary_field = "Data_Value"
//! parallel = true
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::compare::DimensionDiff;
use crate::error::{Error, Result};
use crate::group::{AggregateSpec, SUMMARY_LABEL};

/// Settings for one grouping pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupingConfig {
    /// Attributes never counted as differences
    pub exclude: Vec<String>,
    /// Primary measurement field
    pub primary_field: String,
    /// Optional scaled measurement field
    pub secondary_field: Option<String>,
    /// Value written into the differing key of summary records
    pub summary_label: String,
    /// Attribute expected to be constant within a group
    pub entity_key: Option<String>,
    /// Compare pairs on the rayon thread pool
    pub parallel: bool,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        GroupingConfig {
            exclude: ["VectorId", "Value", "Data_Value", "Scaled Value"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            primary_field: "Data_Value".to_string(),
            secondary_field: Some("Scaled Value".to_string()),
            summary_label: SUMMARY_LABEL.to_string(),
            entity_key: Some("ProductId".to_string()),
            parallel: false,
        }
    }
}

impl GroupingConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: GroupingConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        log::info!("Loaded grouping config from {}", path.as_ref().display());
        Self::from_toml_str(&text)
    }

    /// Replace the exclusion list
    pub fn with_exclude<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Set the primary measurement field
    pub fn with_primary_field(mut self, field: impl Into<String>) -> Self {
        self.primary_field = field.into();
        self
    }

    /// Set or clear the secondary measurement field
    pub fn with_secondary_field(mut self, field: Option<&str>) -> Self {
        self.secondary_field = field.map(str::to_string);
        self
    }

    /// Set the summary label
    pub fn with_summary_label(mut self, label: impl Into<String>) -> Self {
        self.summary_label = label.into();
        self
    }

    /// Set or clear the entity attribute
    pub fn with_entity_key(mut self, key: Option<&str>) -> Self {
        self.entity_key = key.map(str::to_string);
        self
    }

    /// Enable or disable parallel comparison
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.primary_field.trim().is_empty() {
            return Err(Error::Config("primary_field must not be empty".to_string()));
        }
        if self.summary_label.is_empty() {
            return Err(Error::Config("summary_label must not be empty".to_string()));
        }
        if !self.exclude.contains(&self.primary_field) {
            log::warn!(
                "primary field '{}' is not in the exclusion list; excluding it anyway",
                self.primary_field
            );
        }
        Ok(())
    }

    /// Exclusion set including the measurement fields
    pub fn effective_exclusions(&self) -> BTreeSet<String> {
        let mut exclude: BTreeSet<String> = self.exclude.iter().cloned().collect();
        exclude.insert(self.primary_field.clone());
        if let Some(secondary) = &self.secondary_field {
            exclude.insert(secondary.clone());
        }
        exclude
    }

    /// Comparator for these settings
    pub fn comparator(&self) -> DimensionDiff {
        DimensionDiff::new(self.effective_exclusions())
    }

    /// Aggregation settings shared by every group of a pass
    pub fn aggregate_spec(&self) -> Arc<AggregateSpec> {
        Arc::new(AggregateSpec {
            primary_field: self.primary_field.clone(),
            secondary_field: self.secondary_field.clone(),
            summary_label: self.summary_label.clone(),
            entity_key: self.entity_key.clone(),
        })
    }
}
