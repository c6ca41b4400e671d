//! Error types for the buddydocs application.
//!
//! The store reports exactly three kinds of failure to its callers
//! (`StorageUnavailable`, `NotFound`, `ValidationFailed`). The remaining
//! variants belong to the outer layers: configuration and the CLI.

use std::io;

use thiserror::Error;

use crate::DocumentId;

/// The main error type for the buddydocs application.
#[derive(Error, Debug)]
pub enum DocsError {
    /// The backing store could not be opened, or a read/write failed at the
    /// storage layer. Retryable by the user, never retried automatically.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable { message: String },

    /// Document was not found when performing an operation.
    #[error("Document not found: {id}")]
    NotFound { id: DocumentId },

    /// Input rejected before reaching the store.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// Errors related to file I/O outside the store.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization outside the store.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },
}

impl DocsError {
    pub(crate) fn storage(message: impl Into<String>) -> Self {
        DocsError::StorageUnavailable {
            message: message.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        DocsError::ValidationFailed {
            message: message.into(),
        }
    }

    /// Whether a fresh user action could reasonably succeed where this failed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DocsError::StorageUnavailable { .. } | DocsError::Io(_))
    }
}
