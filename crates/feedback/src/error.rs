//! Error types for the feedback loop.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FeedbackError {
    #[error("Unknown action '{0}' (expected like, unlike, click or skip)")]
    UnknownAction(String),

    #[error("No item is awaiting feedback")]
    NoPendingItem,

    #[error("Agent expects states of size {expected}, encoder produces {actual}")]
    StateSizeMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, FeedbackError>;
