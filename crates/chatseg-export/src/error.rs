//! Error types for topic export.

use thiserror::Error;

/// Errors that can occur while exporting topics.
///
/// Shape errors are raised before anything is written.
#[derive(Debug, Error)]
pub enum ExportError {
    /// No topics to export
    #[error("Cannot export an empty topic list")]
    EmptyBatch,

    /// Topics need at least one context message and a response
    #[error("Topic size must be >= 2, got {size}")]
    TopicTooSmall { size: usize },

    /// A topic disagrees with the first topic's length
    #[error("Topic {index} has {actual} messages, expected {expected}")]
    SizeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
