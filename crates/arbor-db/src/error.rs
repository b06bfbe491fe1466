//! Error types for the storage layer.
//!
//! All errors are propagated via [`StorageError`], carrying the path or
//! version that was involved.

use std::path::PathBuf;

/// Errors that can occur while loading or persisting pending replants.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A serialization or deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The blob was written by a format this build does not read.
    #[error("Unsupported blob version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the blob.
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },

    /// The backend cannot operate on this host.
    #[error("Storage unsupported at {root}: {reason}")]
    Unsupported {
        /// The configured storage root.
        root: PathBuf,
        /// Why it cannot be used.
        reason: String,
    },
}

impl StorageError {
    /// Wrap an I/O error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
