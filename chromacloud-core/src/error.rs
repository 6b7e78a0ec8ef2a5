//! Error types for chromacloud

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for chromacloud operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },

    #[error("invalid scale factor {scale}: {reason}")]
    InvalidScale { scale: f32, reason: String },

    #[error("invalid image shape: {0}")]
    InvalidImageShape(String),

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),
}

impl Error {
    /// Shorthand for an [`Error::ImageLoad`] carrying any displayable cause
    pub fn image_load(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::ImageLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for chromacloud operations
pub type Result<T> = std::result::Result<T, Error>;
