//! User-facing operation errors
//!
//! Every variant is local and non-fatal: the caller reports the message and
//! carries on with its state unchanged.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors returned by quote operations
#[derive(Error, Debug)]
pub enum QuoteError {
    /// Quote text or category was empty after trimming
    #[error("Please enter both a quote and a category.")]
    Validation,

    /// Import payload is not parseable JSON
    #[error("Error reading file. Ensure it's a valid JSON file.")]
    InvalidJson(#[source] serde_json::Error),

    /// Import payload is JSON but not an array of quote objects
    #[error("Invalid file format. Please upload a JSON array of quotes.")]
    NotAnArray,

    /// Collection could not be serialized
    #[error("Failed to encode quotes: {0}")]
    Encode(#[source] serde_json::Error),

    /// Underlying storage failure
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl QuoteError {
    /// Whether the error came from rejected input rather than the system
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            QuoteError::Validation | QuoteError::InvalidJson(_) | QuoteError::NotAnArray
        )
    }
}

pub type QuoteResult<T> = Result<T, QuoteError>;
