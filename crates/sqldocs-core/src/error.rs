//! Error types for SqlDocs

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for SqlDocs operations
#[derive(Error, Debug)]
pub enum SqlDocsError {
    #[error("Unsupported database engine: {0}")]
    UnsupportedEngine(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Introspection error: {0}")]
    Introspection(String),

    #[error("Schema file {} not found", .0.display())]
    DocumentNotFound(PathBuf),

    #[error("Schema file {} could not be parsed: {source}", path.display())]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cancelled")]
    Cancelled,
}

impl SqlDocsError {
    /// Whether this error represents a deliberate abort rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SqlDocsError::Cancelled)
    }
}

/// Result type alias for SqlDocs operations
pub type Result<T> = std::result::Result<T, SqlDocsError>;
