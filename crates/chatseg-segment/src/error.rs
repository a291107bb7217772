//! Segmentation error types.

use thiserror::Error;

/// Errors that can occur while building or running a segmentor.
#[derive(Debug, Error)]
pub enum SegmentError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Message source could not be loaded
    #[error("Load error: {0}")]
    Load(#[from] chatseg_types::TypesError),

    /// Scoring model error
    #[error("Model error: {0}")]
    Model(#[from] chatseg_model::ModelError),
}
