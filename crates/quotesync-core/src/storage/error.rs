//! Storage error handling

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A failed read or write in the data directory
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Cannot create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Permission denied on '{path}'")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("No space left while writing '{path}'")]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Covers the temp file write and the final rename
    #[error("Failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to encode '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// A read failure, classified by kind
    pub fn read(path: PathBuf, source: io::Error) -> Self {
        classify(path, source).unwrap_or_else(|(path, source)| StorageError::Read { path, source })
    }

    /// A write failure, classified by kind
    pub fn write(path: PathBuf, source: io::Error) -> Self {
        classify(path, source).unwrap_or_else(|(path, source)| StorageError::Write { path, source })
    }

    /// What the user can do about it, if anything
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } | StorageError::CreateDirectory { .. } => {
                Some("Check permissions on the data directory, or point QUOTESYNC_DATA_DIR elsewhere.")
            }
            _ => None,
        }
    }
}

/// Permission and disk-full failures get their own variants
fn classify(path: PathBuf, source: io::Error) -> Result<StorageError, (PathBuf, io::Error)> {
    if source.kind() == io::ErrorKind::PermissionDenied {
        return Ok(StorageError::PermissionDenied { path, source });
    }

    let msg = source.to_string().to_lowercase();
    if msg.contains("no space left") || msg.contains("quota exceeded") {
        return Ok(StorageError::DiskFull { path, source });
    }

    Err((path, source))
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
