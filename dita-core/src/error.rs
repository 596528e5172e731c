//! Error types for dita.

use thiserror::Error;

/// Errors that can occur in dita operations.
#[derive(Error, Debug)]
pub enum DitaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid category '{0}'. Expected one of: all, historical, literary, holiday")]
    InvalidCategory(String),

    #[error("Malformed event date '{0}'. Expected YYYY-MM-DD or MM-DD")]
    MalformedDate(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Cache '{0}' is not available")]
    CacheUnavailable(String),

    #[error("Could not read cache entry '{key}': {reason}")]
    CacheRead { key: String, reason: String },

    #[error("Could not fetch '{key}': {reason}")]
    Fetch { key: String, reason: String },

    #[error("Install failed for asset '{asset}': {reason}")]
    Install { asset: String, reason: String },

    #[error("Permission '{0}' has not been granted")]
    PermissionDenied(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for dita operations.
pub type DitaResult<T> = Result<T, DitaError>;
