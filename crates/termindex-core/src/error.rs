//! Error types for the term index.
//!
//! Absence of a type definition or of a field payload is never an error here;
//! those paths produce fewer index rows instead. The variants below cover
//! storage, serialization and wiring failures.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the term index library.
#[derive(Debug, Error)]
pub enum TermIndexError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Wiring errors
    #[error("Service not registered: {service}")]
    ServiceUnavailable { service: String },

    #[error("Data migration failed at step {step}: {message}")]
    Migration { step: String, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Content item not found: {content_item_id}")]
    NotFound { content_item_id: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for term index operations.
pub type Result<T> = std::result::Result<T, TermIndexError>;

impl From<std::io::Error> for TermIndexError {
    fn from(err: std::io::Error) -> Self {
        TermIndexError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for TermIndexError {
    fn from(err: serde_json::Error) -> Self {
        TermIndexError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for TermIndexError {
    fn from(err: rusqlite::Error) -> Self {
        TermIndexError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl TermIndexError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        TermIndexError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Error for a connection mutex that could not be acquired.
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        TermIndexError::Database {
            message: format!("Failed to acquire {} lock", what),
            source: None,
        }
    }

    /// HTTP status code used by the server when this error reaches a handler.
    pub fn status_code(&self) -> u16 {
        match self {
            TermIndexError::NotFound { .. } => 404,
            TermIndexError::Validation { .. } => 400,
            TermIndexError::ServiceUnavailable { .. } => 503,
            _ => 500,
        }
    }
}
