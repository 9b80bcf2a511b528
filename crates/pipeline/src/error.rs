//! Error types for the ranking pipeline.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// A record lacks the field needed to identify it
    #[error("Malformed record #{position} in {list} list: missing {field}")]
    MalformedRecord {
        list: &'static str,
        position: usize,
        field: &'static str,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
