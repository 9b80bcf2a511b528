//! Error types for the data-loader crate.
//!
//! Every failure while reading the restaurant catalogue or the user profile
//! export is reported through [`DataLoadError`], so callers can tell a missing
//! file apart from a malformed record.

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The file was not valid JSON, or did not match the expected shape
    #[error("JSON error in {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record in a data file couldn't be interpreted
    ///
    /// `record` is the position of the offending entry (0-based) or its key.
    #[error("Parse error at record {record} in {file}: {reason}")]
    ParseError {
        file: String,
        record: String,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., favourite restaurant not in catalogue)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
