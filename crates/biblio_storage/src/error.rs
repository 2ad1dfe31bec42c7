//! Error types for storage operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Writing the replacement file failed; the previous contents are intact.
    #[error("failed to replace {path}: {source}")]
    ReplaceFailed {
        /// The file that was being replaced.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The resource exists but is not a regular file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),
}
