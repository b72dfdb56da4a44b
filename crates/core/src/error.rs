//! Error types for bioc2odin.
//!
//! This module defines a unified error enum covering configuration, source
//! lookup, malformed input, I/O, XML parsing, per-document batch failures,
//! archive packaging, and serialization.

use thiserror::Error;

/// Unified error type for bioc2odin.
///
/// All fallible functions return `Result<T, AppError>`.
/// Offset anomalies inside a document (gaps, overlaps, degenerate spans) are
/// never represented here: they are repaired where they are found.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// A requested document or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Structurally invalid input (configuration files, source records)
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// BioC XML parsing errors
    #[error("XML error: {0}")]
    Xml(String),

    /// A single document failed during a batch run
    #[error("Document '{doc_id}' failed: {reason}")]
    PerDocument { doc_id: String, reason: String },

    /// Archive packaging errors
    #[error("Archive error: {0}")]
    Archive(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Wrap any error as a failure of one document in a batch run.
    pub fn per_document(doc_id: impl Into<String>, err: impl std::fmt::Display) -> Self {
        AppError::PerDocument {
            doc_id: doc_id.into(),
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for AppError {
    fn from(err: quick_xml::Error) -> Self {
        AppError::Xml(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
