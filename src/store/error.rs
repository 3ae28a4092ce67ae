//! Storage error type shared by the credential store and content collections

use thiserror::Error;

/// Errors that can occur while reading or writing the JSON documents
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Document missing: {0}")]
    Missing(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record: {0}")]
    Invalid(String),

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Other(String),
}
