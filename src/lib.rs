//! Groups statistical observations that are identical except for one
//! dimension and keeps a running mean for each group.
//!
//! ```
//! use dimgroup::{group_records, GroupingConfig, Record};
//!
//! let records: Vec<Record> = [2020, 2021, 2022]
//!     .iter()
//!     .zip([10.0, 20.0, 30.0])
//!     .map(|(year, value)| {
//!         Record::new()
//!             .with("Geography", "Canada")
//!             .with("Year", *year)
//!             .with("Data_Value", value)
//!     })
//!     .collect();
//!
//! let groups = group_records(&records, &GroupingConfig::default()).unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].differing_key(), "Year");
//! assert_eq!(groups[0].len(), 4);
//! ```

pub mod assemble;
pub mod cache;
pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod group;
pub mod intersection;
pub mod io;
pub mod record;
pub mod registry;

// Re-export commonly used types
pub use cache::LookupCache;
pub use compare::DimensionDiff;
pub use config::GroupingConfig;
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, LoggingSink};
pub use error::{Error, Result};
pub use group::{AggregationFailure, Group, GroupEntry, SUMMARY_LABEL};
pub use intersection::IntersectionTable;
pub use record::{Record, Value};
pub use registry::{analyze, group_records, Analysis, GroupRegistry, PairOutcome, RecordId};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
