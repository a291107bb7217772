//! Scoring model error types.

use thiserror::Error;

/// Errors that can occur while loading or running the window model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact missing, unreadable or corrupt
    #[error("Failed to load artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    /// Window passed for scoring has the wrong length
    #[error("Window size mismatch: expected {expected}, got {actual}")]
    WindowSize { expected: usize, actual: usize },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ModelError {
    pub(crate) fn artifact(path: &std::path::Path, reason: impl ToString) -> Self {
        ModelError::ArtifactLoad {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
