//! Error types for I/O operations

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading image files
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Cannot decode {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IoError {
    /// Classify an `std::io::Error` raised while touching `path`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound { path }
        } else {
            IoError::Io { path, source }
        }
    }
}

impl From<IoError> for chromacloud_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::FileNotFound { path } => {
                chromacloud_core::Error::image_load(path, "file not found")
            }
            IoError::Decode { path, message } => chromacloud_core::Error::image_load(path, message),
            IoError::Io { path, source } => chromacloud_core::Error::image_load(path, source),
        }
    }
}
