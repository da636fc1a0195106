pub mod csv;
pub mod export;
pub mod json;

// Re-export commonly used functions
pub use self::csv::{write_intersection, write_rows};
pub use export::{partition_rows, sheet_name, Partition};
pub use json::{read_document, read_records, records_from_str, write_groups, write_records};
