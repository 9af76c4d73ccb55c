//! Error types for the permission engine

use thiserror::Error;

use crate::scope::ScopePath;

/// Permission engine errors
#[derive(Debug, Error)]
pub enum PermissionError {
    /// Structurally invalid scope segment (empty, whitespace, embedded separator)
    #[error("Invalid scope segment: {0:?}")]
    InvalidSegment(String),

    /// Permission key was empty
    #[error("Permission key cannot be empty")]
    EmptyKey,

    /// Account identifier was empty
    #[error("Account id cannot be empty")]
    EmptyAccountId,

    /// Key not present in an account collection
    #[error("Permission key not found: {0}")]
    KeyNotFound(String),

    /// Entry not present in a scope collection
    #[error("No entry for account '{account}' with key '{key}'")]
    EntryNotFound { account: String, key: String },

    /// Resource does not exist in the store
    #[error("Resource not found: {0}")]
    ResourceNotFound(ScopePath),

    /// Authorization denial from the protected store
    #[error("Account '{account}' is not permitted '{permission}' at {resource}")]
    NotPermitted {
        account: String,
        permission: String,
        resource: ScopePath,
    },

    /// Backend failure (propagated, never swallowed by the cache)
    #[error("Backend error: {0}")]
    Backend(String),

    /// Payload (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for permission operations
pub type Result<T> = std::result::Result<T, PermissionError>;
