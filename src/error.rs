use thiserror::Error;

/// Errors raised by the grouping engine and its IO helpers
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error")]
    Io(#[source] std::io::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data format error: {0}")]
    Format(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// A group lost its summary entry. This is an internal logic defect and
    /// is never recovered from.
    #[error("Summary record missing from group with differing key '{differing_key}'")]
    MissingSummary { differing_key: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}
